/// Counts extracted from `git status --porcelain=v2 --branch`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusSummary {
    pub branch: String,
    pub has_upstream: bool,
    pub ahead: u32,
    pub behind: u32,
    pub modified: u32,
    pub staged: u32,
    pub untracked: u32,
}

impl StatusSummary {
    pub fn is_dirty(&self) -> bool {
        self.modified > 0 || self.staged > 0 || self.untracked > 0
    }
}

/// Line totals from `git diff --numstat`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiffStat {
    pub added: u64,
    pub deleted: u64,
}

/// Parses porcelain v2 output. Unknown lines are ignored.
///
/// A detached head is reported as `HEAD`. Tracked entries count as staged
/// when their index column is set and as modified when their worktree column
/// is set; unmerged entries count as modified.
pub fn parse_porcelain_v2(output: &str) -> StatusSummary {
    let mut summary = StatusSummary::default();
    for line in output.lines() {
        if let Some(header) = line.strip_prefix("# ") {
            parse_header(header, &mut summary);
            continue;
        }
        let mut fields = line.splitn(3, ' ');
        match (fields.next(), fields.next()) {
            (Some("1" | "2"), Some(xy)) => {
                let mut columns = xy.chars();
                if columns.next().is_some_and(|c| c != '.') {
                    summary.staged += 1;
                }
                if columns.next().is_some_and(|c| c != '.') {
                    summary.modified += 1;
                }
            }
            (Some("u"), Some(_)) => summary.modified += 1,
            (Some("?"), Some(_)) => summary.untracked += 1,
            _ => {}
        }
    }
    summary
}

fn parse_header(header: &str, summary: &mut StatusSummary) {
    let Some((key, value)) = header.split_once(' ') else {
        return;
    };
    match key {
        "branch.head" => {
            summary.branch = if value == "(detached)" {
                "HEAD".to_string()
            } else {
                value.to_string()
            };
        }
        "branch.upstream" => summary.has_upstream = true,
        "branch.ab" => {
            for part in value.split_whitespace() {
                if let Some(ahead) = part.strip_prefix('+') {
                    summary.ahead = ahead.parse().unwrap_or(0);
                } else if let Some(behind) = part.strip_prefix('-') {
                    summary.behind = behind.parse().unwrap_or(0);
                }
            }
        }
        _ => {}
    }
}

/// Sums `git diff --numstat` output. Binary files (`-`) contribute nothing.
pub fn parse_numstat(output: &str) -> DiffStat {
    let mut stat = DiffStat::default();
    for line in output.lines() {
        let mut fields = line.split('\t');
        let (Some(added), Some(deleted)) = (fields.next(), fields.next()) else {
            continue;
        };
        stat.added += added.parse::<u64>().unwrap_or(0);
        stat.deleted += deleted.parse::<u64>().unwrap_or(0);
    }
    stat
}
