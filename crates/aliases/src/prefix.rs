use crate::normalize::CaseSensitivity;

/// Winner of [`longest_prefix_match`].
#[derive(Debug)]
pub struct PrefixMatch<'c, 'p, T> {
    pub candidate: &'c T,
    /// Part of the input path following the matched key, in the input's casing.
    pub remainder: &'p str,
}

/// Picks the candidate whose key is the longest directory-boundary prefix of
/// `path`.
///
/// Keys of equal length are ordered by their normalized form and the smaller
/// one wins; identical keys keep the candidate seen first. The result is
/// therefore independent of iteration order except for exact duplicates.
pub fn longest_prefix_match<'c, 'p, T, I, F>(
    candidates: I,
    path: &'p str,
    key: F,
    case: CaseSensitivity,
) -> Option<PrefixMatch<'c, 'p, T>>
where
    T: 'c,
    I: IntoIterator<Item = &'c T>,
    F: Fn(&T) -> &str,
{
    let mut best: Option<PrefixMatch<'c, 'p, T>> = None;
    for candidate in candidates {
        let root = key(candidate);
        let Some(remainder) = case.strip_dir_prefix(path, root) else {
            continue;
        };
        let wins = match &best {
            None => true,
            Some(current) => {
                let current_root = key(current.candidate);
                root.len() > current_root.len()
                    || (root.len() == current_root.len()
                        && case.normalize(root) < case.normalize(current_root))
            }
        };
        if wins {
            best = Some(PrefixMatch {
                candidate,
                remainder,
            });
        }
    }
    best
}
