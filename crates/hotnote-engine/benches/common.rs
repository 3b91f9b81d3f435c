// Benchmark helper functions - Rust's dead code analysis doesn't understand
// that these are used by benchmark files in the same directory
// See: https://users.rust-lang.org/t/cargo-rustc-benches-awarnings/110111/2
use hotnote_engine::{Comment, Position};

#[allow(dead_code)]
pub fn generate_markdown_content(size: usize) -> String {
    let base = "# Title\n\n## Section\n\nParagraph with some content.\n\n- Bullet point\n  - Nested item\n- Another item\n\n```rust\nfn example() {\n    println!(\"Hello\");\n}\n```\n\n";
    base.repeat(size)
}

/// One comment per paragraph, attached to the word "content"
#[allow(dead_code)]
pub fn generate_comments(doc: &str) -> Vec<Comment> {
    let chars: Vec<char> = doc.chars().collect();
    let needle: Vec<char> = "content".chars().collect();
    chars
        .windows(needle.len())
        .enumerate()
        .filter(|(_, window)| *window == needle.as_slice())
        .map(|(from, _)| Comment::new(doc, Position::new(from, from + needle.len()), 32))
        .collect()
}
