/// A document with one of everything the default backend lays out.
pub fn kitchen_sink() -> String {
    r#"# Kitchen Sink

Intro paragraph with **bold**, *italic*, `code` and a [link](https://example.com/docs).

## Lists

- first
- second
  - nested
1. one
2. two

- [x] shipped
- [ ] pending

> A quoted line.

```rust
fn main() {
    println!("hi");
}
```

| Name | Value |
|------|-------|
| alpha | 1 |

---

Closing words.
"#
    .to_string()
}

/// `count` numbered paragraphs, enough to force page breaks.
pub fn many_paragraphs(count: usize) -> String {
    (1..=count)
        .map(|i| format!("Paragraph number {} of the long document.", i))
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn heading(level: usize, text: &str) -> String {
    format!("{} {}", "#".repeat(level), text)
}
