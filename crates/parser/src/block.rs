//! Segmentation of transcription output into candidate table blocks

/// Contiguous run of lines that all contain the delimiter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextBlock {
    /// 0-based line number of the first line in the (trimmed) input
    pub first_line: usize,
    pub lines: Vec<String>,
}

/// Split `text` into blocks of delimiter-bearing lines.
///
/// Any line without the delimiter closes the open block, blank lines
/// included; a blank line that happens to contain the delimiter does not.
/// A block still open at end of input is emitted as well.
#[must_use]
pub fn segment_blocks(text: &str, delimiter: char) -> Vec<TextBlock> {
    let mut blocks = Vec::new();
    let mut current: Option<TextBlock> = None;

    for (line_no, line) in text.trim().lines().enumerate() {
        if line.contains(delimiter) {
            current
                .get_or_insert_with(|| TextBlock {
                    first_line: line_no,
                    lines: Vec::new(),
                })
                .lines
                .push(line.to_string());
        } else if let Some(block) = current.take() {
            blocks.push(block);
        }
    }

    if let Some(block) = current {
        blocks.push(block);
    }

    blocks
}
