//! Zero-context unified diffs and the hunk-header parser that turns them
//! into changed-line ranges.
//!
//! The parser is the source of truth for "where did the output change":
//! hunk headers of the shape `@@ -A[,B] +C[,D] @@` yield ranges `[C, C+D)`
//! on the new file, with `D` defaulting to 1 when absent.

use std::ops::Range;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    Keep,
    Del,
    Ins,
}

/// Guard against quadratic blowup on huge mismatches. Above this the
/// untrimmed middle is emitted as a single replace hunk.
const MAX_LCS_CELLS: usize = 4_000_000;

/// Line-based unified diff with zero context lines.
pub fn unified_diff(
    expected: &str,
    actual: &str,
    expected_label: &str,
    actual_label: &str,
) -> String {
    let old: Vec<&str> = expected.lines().collect();
    let new: Vec<&str> = actual.lines().collect();

    let mut prefix = 0;
    while prefix < old.len() && prefix < new.len() && old[prefix] == new[prefix] {
        prefix += 1;
    }
    let mut suffix = 0;
    while suffix < old.len() - prefix
        && suffix < new.len() - prefix
        && old[old.len() - 1 - suffix] == new[new.len() - 1 - suffix]
    {
        suffix += 1;
    }

    let ops = edit_script(
        &old[prefix..old.len() - suffix],
        &new[prefix..new.len() - suffix],
    );

    let mut out = String::new();
    out.push_str(&format!("--- {expected_label}\n"));
    out.push_str(&format!("+++ {actual_label}\n"));

    let mut old_line = prefix;
    let mut new_line = prefix;
    let mut k = 0;
    while k < ops.len() {
        if ops[k] == Op::Keep {
            old_line += 1;
            new_line += 1;
            k += 1;
            continue;
        }

        let hunk_old_start = old_line;
        let hunk_new_start = new_line;
        let mut dels: Vec<&str> = Vec::new();
        let mut adds: Vec<&str> = Vec::new();
        while k < ops.len() && ops[k] != Op::Keep {
            match ops[k] {
                Op::Del => {
                    dels.push(old[old_line]);
                    old_line += 1;
                }
                Op::Ins => {
                    adds.push(new[new_line]);
                    new_line += 1;
                }
                Op::Keep => unreachable!(),
            }
            k += 1;
        }

        // A zero-count side is positioned at the line before the hunk.
        let old_pos = if dels.is_empty() { hunk_old_start } else { hunk_old_start + 1 };
        let new_pos = if adds.is_empty() { hunk_new_start } else { hunk_new_start + 1 };

        out.push_str("@@ -");
        push_position(&mut out, old_pos, dels.len());
        out.push_str(" +");
        push_position(&mut out, new_pos, adds.len());
        out.push_str(" @@\n");
        for line in dels {
            out.push('-');
            out.push_str(line);
            out.push('\n');
        }
        for line in adds {
            out.push('+');
            out.push_str(line);
            out.push('\n');
        }
    }

    out
}

fn push_position(out: &mut String, pos: usize, count: usize) {
    out.push_str(&pos.to_string());
    if count != 1 {
        out.push(',');
        out.push_str(&count.to_string());
    }
}

fn edit_script(old: &[&str], new: &[&str]) -> Vec<Op> {
    if old.is_empty() || new.is_empty() || old.len() * new.len() > MAX_LCS_CELLS {
        let mut ops = vec![Op::Del; old.len()];
        ops.extend(std::iter::repeat_n(Op::Ins, new.len()));
        return ops;
    }

    let n = old.len();
    let m = new.len();
    let width = m + 1;
    let mut table = vec![0u32; (n + 1) * width];
    for i in (0..n).rev() {
        for j in (0..m).rev() {
            table[i * width + j] = if old[i] == new[j] {
                table[(i + 1) * width + j + 1] + 1
            } else {
                table[(i + 1) * width + j].max(table[i * width + j + 1])
            };
        }
    }

    let mut ops = Vec::with_capacity(n + m);
    let (mut i, mut j) = (0, 0);
    while i < n && j < m {
        if old[i] == new[j] {
            ops.push(Op::Keep);
            i += 1;
            j += 1;
        } else if table[(i + 1) * width + j] >= table[i * width + j + 1] {
            ops.push(Op::Del);
            i += 1;
        } else {
            ops.push(Op::Ins);
            j += 1;
        }
    }
    ops.extend(std::iter::repeat_n(Op::Del, n - i));
    ops.extend(std::iter::repeat_n(Op::Ins, m - j));
    ops
}

/// Extract changed-line ranges (on the new file) from hunk headers.
pub fn changed_lines(diff: &str) -> Vec<Range<usize>> {
    let mut ranges = Vec::new();
    for line in diff.lines() {
        let Some(rest) = line.strip_prefix("@@ -") else {
            continue;
        };
        let Some(plus) = rest.find('+') else {
            continue;
        };
        let new_part = &rest[plus + 1..];
        let new_part = match new_part.find(' ') {
            Some(end) => &new_part[..end],
            None => new_part,
        };
        let (start, count) = match new_part.split_once(',') {
            Some((s, c)) => (s.parse::<usize>().ok(), c.parse::<usize>().ok()),
            None => (new_part.parse::<usize>().ok(), Some(1)),
        };
        if let (Some(start), Some(count)) = (start, count) {
            if count > 0 {
                ranges.push(start..start + count);
            }
        }
    }
    ranges
}
