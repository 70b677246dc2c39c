//! Elastic-tabstop alignment in the manner of gofmt's tabwriter.
//!
//! The printer separates alignable cells with [`CELL`] and marks lines that
//! must not align with the lines above them with a leading [`SECTION`]. A
//! column is aligned across a run of consecutive lines that share the same
//! indentation and all terminate that column; columns that are empty for
//! the whole run are discarded.

pub(super) const CELL: char = '\u{0B}';
pub(super) const SECTION: char = '\u{0C}';

struct Line {
    indent: usize,
    section: bool,
    cells: Vec<String>,
}

pub(super) fn align(text: &str) -> String {
    let mut lines: Vec<Line> = text.split('\n').map(split_line).collect();

    let mut col = 0;
    loop {
        let mut any = false;
        let mut i = 0;
        while i < lines.len() {
            if lines[i].cells.len() <= col + 1 {
                i += 1;
                continue;
            }
            any = true;
            let mut j = i + 1;
            while j < lines.len()
                && lines[j].cells.len() > col + 1
                && !lines[j].section
                && lines[j].indent == lines[i].indent
            {
                j += 1;
            }
            let width = lines[i..j]
                .iter()
                .map(|l| l.cells[col].chars().count())
                .max()
                .unwrap_or(0);
            if width > 0 {
                for line in &mut lines[i..j] {
                    let cell = &mut line.cells[col];
                    let pad = width + 1 - cell.chars().count();
                    cell.extend(std::iter::repeat(' ').take(pad));
                }
            }
            i = j;
        }
        if !any {
            break;
        }
        col += 1;
    }

    let mut out = String::with_capacity(text.len());
    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let joined: String = line.cells.concat();
        let joined = if line.cells.len() > 1 {
            joined.trim_end()
        } else {
            joined.as_str()
        };
        if !joined.is_empty() {
            out.extend(std::iter::repeat('\t').take(line.indent));
        }
        out.push_str(joined);
    }
    out
}

fn split_line(raw: &str) -> Line {
    let section = raw.starts_with(SECTION);
    let raw = raw.trim_start_matches(SECTION);
    let body = raw.trim_start_matches('\t');
    Line {
        indent: raw.len() - body.len(),
        section,
        cells: body.split(CELL).map(str::to_owned).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aligns_runs_of_cells() {
        let text = format!("\ta{CELL}int\n\tbcd{CELL}string\nx\n");
        assert_eq!(align(&text), "\ta   int\n\tbcd string\nx\n");
    }

    #[test]
    fn section_marker_starts_a_new_run() {
        let text = format!("x := 1{CELL}// a\n{SECTION}yy := 2{CELL}// b\n");
        assert_eq!(align(&text), "x := 1 // a\nyy := 2 // b\n");
    }

    #[test]
    fn lines_without_cells_break_runs() {
        let text = format!("a{CELL}// 1\nfoo()\nlonger{CELL}// 2\n");
        assert_eq!(align(&text), "a // 1\nfoo()\nlonger // 2\n");
    }

    #[test]
    fn empty_lines_keep_no_indentation() {
        assert_eq!(align("\tx\n\n\ty"), "\tx\n\n\ty");
    }
}
