//! Static table of likely successor characters, used to warm the glyph
//! cache while the user is still typing.

use lettra_core::normalize_char;

/// Most frequent English successors of `previous`, best first.
pub fn likely_next(previous: char) -> &'static [char] {
    match normalize_char(previous) {
        'a' => &['n', 't', 's', 'r', 'l'],
        'b' => &['e', 'o', 'l', 'a'],
        'c' => &['o', 'h', 'e', 'a', 't'],
        'd' => &['e', 'i', 'a', 'o'],
        'e' => &['r', 's', 'n', 'd', 'a'],
        'f' => &['o', 'i', 'e', 'r'],
        'g' => &['e', 'h', 'r', 'a'],
        'h' => &['e', 'a', 'i', 'o'],
        'i' => &['n', 't', 's', 'o', 'c'],
        'j' => &['u', 'o', 'a'],
        'k' => &['e', 'i', 'n'],
        'l' => &['e', 'l', 'i', 'a', 'y'],
        'm' => &['e', 'a', 'o', 'i'],
        'n' => &['g', 'd', 't', 'e', 's'],
        'o' => &['n', 'r', 'u', 'f', 'm'],
        'p' => &['e', 'r', 'o', 'a', 'l'],
        'q' => &['u'],
        'r' => &['e', 'i', 'o', 'a', 's'],
        's' => &['t', 'e', 'h', 'i', 's'],
        't' => &['h', 'e', 'i', 'o', 'a'],
        'u' => &['r', 's', 'n', 't'],
        'v' => &['e', 'i', 'a'],
        'w' => &['a', 'h', 'e', 'i'],
        'x' => &['p', 't', 'i'],
        'y' => &['o', 'e', 's'],
        'z' => &['e', 'a'],
        _ => &[],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_pairs() {
        assert_eq!(likely_next('t')[0], 'h');
        assert_eq!(likely_next('Q'), &['u']);
    }

    #[test]
    fn test_unknown_has_no_successors() {
        assert!(likely_next('7').is_empty());
        assert!(likely_next(' ').is_empty());
    }
}
