/// Policy for resolving source coordinates that fall outside the image.
#[derive(Debug, Clone, PartialEq)]
pub enum BorderMode<T> {
    Clamp,
    Constant(T),
    /// Mirror including the edge pixel: `c b a | a b c | c b a`.
    Reflect,
}

/// Maps a possibly out-of-range index into `[0, len)`.
///
/// Returns `None` for `Constant` (the caller substitutes the fill value) and
/// for empty axes.
pub fn map_index<T>(i: isize, len: usize, mode: &BorderMode<T>) -> Option<usize> {
    if len == 0 {
        return None;
    }

    match mode {
        BorderMode::Constant(_) => {
            if i < 0 || i >= len as isize {
                None
            } else {
                Some(i as usize)
            }
        }
        BorderMode::Clamp => Some(i.clamp(0, len as isize - 1) as usize),
        BorderMode::Reflect => {
            let period = (2 * len) as isize;
            let r = i.rem_euclid(period) as usize;
            if r < len { Some(r) } else { Some(2 * len - 1 - r) }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{BorderMode, map_index};

    #[test]
    fn clamp_and_constant() {
        let clamp = BorderMode::<f64>::Clamp;
        assert_eq!(map_index(-3, 5, &clamp), Some(0));
        assert_eq!(map_index(4, 5, &clamp), Some(4));
        assert_eq!(map_index(99, 5, &clamp), Some(4));

        let constant = BorderMode::Constant(0.0f64);
        assert_eq!(map_index(-1, 5, &constant), None);
        assert_eq!(map_index(2, 5, &constant), Some(2));
        assert_eq!(map_index(5, 5, &constant), None);
        assert_eq!(map_index(0, 0, &clamp), None);
    }

    #[test]
    fn reflect_repeats_edge() {
        let mode = BorderMode::<f64>::Reflect;
        let cases = [(-4, 3), (-3, 2), (-2, 1), (-1, 0), (0, 0), (4, 4), (5, 4), (6, 3), (9, 0), (10, 0)];
        for (i, expected) in cases {
            assert_eq!(map_index(i, 5, &mode), Some(expected), "index {i}");
        }
        for i in -6..=6 {
            assert_eq!(map_index(i, 1, &mode), Some(0));
        }
    }
}
