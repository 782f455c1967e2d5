// Run finders: repeated byte, repeated 2-byte word, incrementing byte.
//
// Each returns the run length in command units, capped at `MAX_MATCH`.
// A run of one unit is always available for byte and increment runs; a
// word run needs a complete 2-byte pattern at `pos`.

use super::config::MAX_MATCH;

/// Length of the run of `data[pos]` starting at `pos`.
pub fn byte_run(data: &[u8], pos: usize) -> usize {
    let Some(&b) = data.get(pos) else {
        return 0;
    };
    data[pos..]
        .iter()
        .take(MAX_MATCH)
        .take_while(|&&x| x == b)
        .count()
}

/// Number of repetitions of the word `data[pos..pos + 2]` starting at `pos`.
pub fn word_run(data: &[u8], pos: usize) -> usize {
    let Some(pattern) = data.get(pos..pos + 2) else {
        return 0;
    };
    data[pos..]
        .chunks_exact(2)
        .take(MAX_MATCH)
        .take_while(|&w| w == pattern)
        .count()
}

/// Length of the run `n, n+1, ...` (wrapping) starting at `pos`.
pub fn increment_run(data: &[u8], pos: usize) -> usize {
    let Some(&n) = data.get(pos) else {
        return 0;
    };
    data[pos..]
        .iter()
        .take(MAX_MATCH)
        .enumerate()
        .take_while(|&(i, &x)| x == n.wrapping_add(i as u8))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_runs() {
        assert_eq!(byte_run(&[7, 7, 7, 8], 0), 3);
        assert_eq!(byte_run(&[7, 7, 7, 8], 3), 1);
        assert_eq!(byte_run(&[], 0), 0);
        assert_eq!(byte_run(&[1, 2], 2), 0);
    }

    #[test]
    fn byte_run_is_capped() {
        let data = vec![0x41; 5000];
        assert_eq!(byte_run(&data, 0), MAX_MATCH);
        assert_eq!(byte_run(&data, 4000), 1000);
    }

    #[test]
    fn word_runs() {
        assert_eq!(word_run(&[0xAA, 0xBB, 0xAA, 0xBB, 0xAA, 0xBB], 0), 3);
        // Trailing half word does not count.
        assert_eq!(word_run(&[0xAA, 0xBB, 0xAA, 0xBB, 0xAA], 0), 2);
        assert_eq!(word_run(&[0xAA], 0), 0);
        assert_eq!(word_run(&[1, 2, 3], 1), 1);
    }

    #[test]
    fn word_run_is_capped_in_repetitions() {
        let data: Vec<u8> = [1u8, 2].iter().copied().cycle().take(4000).collect();
        assert_eq!(word_run(&data, 0), MAX_MATCH);
    }

    #[test]
    fn increment_runs() {
        assert_eq!(increment_run(&[3, 4, 5, 9], 0), 3);
        assert_eq!(increment_run(&[0xFE, 0xFF, 0x00, 0x01, 0x05], 0), 4);
        assert_eq!(increment_run(&[9], 0), 1);
    }

    #[test]
    fn increment_run_over_full_cycles() {
        let data: Vec<u8> = (0..3000).map(|i| i as u8).collect();
        assert_eq!(increment_run(&data, 10), MAX_MATCH);
    }
}
