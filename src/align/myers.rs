//! Myers' O(ND) shortest edit script, used in its linear space divide-and-conquer form.
//!
//! The output marks every record on each side as either changed (deleted from `old` or inserted
//! into `new`) or unchanged. Unchanged records on both sides form a longest common subsequence and
//! appear in the same relative order.

use std::ops::{Index, IndexMut};

/// Furthest x reached on each diagonal `k = x - y` during one direction of the search.
///
/// Diagonals run from `-(max + 1)` to `max + 1`, so the vector holds `2 * max + 3` slots and is
/// indexed through `offset`. The extra slot at each end covers the `k ± 1` neighbours read on the
/// outermost diagonals.
#[derive(Debug, Clone)]
struct V {
    offset: isize,
    v: Vec<usize>,
}

impl V {
    fn new(max: usize) -> Self {
        Self {
            offset: max as isize + 1,
            v: vec![0; 2 * max + 3],
        }
    }

    fn len(&self) -> usize {
        self.v.len()
    }
}

impl Index<isize> for V {
    type Output = usize;

    fn index(&self, index: isize) -> &Self::Output {
        &self.v[(index + self.offset) as usize]
    }
}

impl IndexMut<isize> for V {
    fn index_mut(&mut self, index: isize) -> &mut Self::Output {
        &mut self.v[(index + self.offset) as usize]
    }
}

/// Start of the middle snake, where both sequences are split before recursing.
#[derive(Debug)]
struct Snake {
    x_start: usize,
    y_start: usize,
}

// One side of the diff, narrowed as the recursion descends, with its changed flags.
struct Records<'a, T> {
    inner: &'a [T],
    changed: &'a mut [bool],
}

impl<'a, T> Records<'a, T> {
    fn new(inner: &'a [T], changed: &'a mut [bool]) -> Self {
        debug_assert!(inner.len() == changed.len());
        Records { inner, changed }
    }

    fn len(&self) -> usize {
        self.inner.len()
    }

    fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    fn slice(&mut self, begin: usize, end: usize) -> Records<'_, T> {
        Records::new(&self.inner[begin..end], &mut self.changed[begin..end])
    }

    fn split_at_mut(&mut self, mid: usize) -> (Records<'_, T>, Records<'_, T>) {
        let (left_inner, right_inner) = self.inner.split_at(mid);
        let (left_changed, right_changed) = self.changed.split_at_mut(mid);

        (
            Records::new(left_inner, left_changed),
            Records::new(right_inner, right_changed),
        )
    }
}

// Runs the forward and backward searches in lock step until their furthest reaching paths
// overlap, and returns where the overlapping snake starts. Only `ceil(max / 2) + 1` rounds are
// needed since the two halves together cover the whole edit script.
fn find_middle_snake<T: PartialEq>(old: &[T], new: &[T], vf: &mut V, vb: &mut V) -> Snake {
    let n = old.len();
    let m = new.len();

    let max = n + m;

    // The edit script length has the parity of `delta`, which decides which direction can
    // detect the overlap.
    let delta = n as isize - m as isize;
    let odd = delta & 1 == 1;

    debug_assert!(vf.len() >= 2 * max + 3);
    debug_assert!(vb.len() >= 2 * max + 3);

    // Both searches start just outside their corner.
    vf[1] = 0;
    vb[1] = 0;

    let d_max = max.div_ceil(2) as isize + 1;
    for d in 0..d_max {
        // From (0, 0) towards (n, m)
        for k in (-d..=d).rev().step_by(2) {
            let mut x = if k == -d || (k != d && vf[k - 1] < vf[k + 1]) {
                vf[k + 1]
            } else {
                vf[k - 1] + 1
            };
            let mut y = (x as isize - k) as usize;

            let (x0, y0) = (x, y);
            while x < n && y < m && old[x] == new[y] {
                x += 1;
                y += 1;
            }

            vf[k] = x;
            // Odd `delta`: the forward path may meet a backward path of the previous round.
            if odd && (k - delta).abs() <= (d - 1) && vf[k] + vb[-(k - delta)] >= n {
                return Snake {
                    x_start: x0,
                    y_start: y0,
                };
            }
        }

        // From (n, m) back towards (0, 0), with x and y counted from the far end
        for k in (-d..=d).rev().step_by(2) {
            let mut x = if k == -d || (k != d && vb[k - 1] < vb[k + 1]) {
                vb[k + 1]
            } else {
                vb[k - 1] + 1
            };
            let mut y = (x as isize - k) as usize;

            while x < n && y < m && old[n - x - 1] == new[m - y - 1] {
                x += 1;
                y += 1;
            }

            vb[k] = x;

            if !odd && (k - delta).abs() <= d && vb[k] + vf[-(k - delta)] >= n {
                return Snake {
                    x_start: n - x,
                    y_start: m - y,
                };
            }
        }
    }

    unreachable!("unable to find a middle snake");
}

fn conquer<T: PartialEq>(mut old: Records<T>, mut new: Records<T>, vf: &mut V, vb: &mut V) {
    let mut start_old = 0;
    let mut start_new = 0;
    let mut end_old = old.len();
    let mut end_new = new.len();

    while start_old < end_old && start_new < end_new && old.inner[start_old] == new.inner[start_new]
    {
        start_old += 1;
        start_new += 1;
    }
    while start_old < end_old
        && start_new < end_new
        && old.inner[end_old - 1] == new.inner[end_new - 1]
    {
        end_old -= 1;
        end_new -= 1;
    }

    let mut old = old.slice(start_old, end_old);
    let mut new = new.slice(start_new, end_new);

    if old.is_empty() {
        new.changed.fill(true);
    } else if new.is_empty() {
        old.changed.fill(true);
    } else {
        // Split on the middle snake and solve both halves.
        let snake = find_middle_snake(old.inner, new.inner, vf, vb);

        let (old_a, old_b) = old.split_at_mut(snake.x_start);
        let (new_a, new_b) = new.split_at_mut(snake.y_start);

        conquer(old_a, new_a, vf, vb);
        conquer(old_b, new_b, vf, vb);
    }
}

/// Computes which records of `old` were deleted and which records of `new` were inserted.
///
/// Returns one flag per record on each side; `false` means the record is part of the common
/// subsequence.
pub fn diff<T: PartialEq>(old: &[T], new: &[T]) -> (Vec<bool>, Vec<bool>) {
    let mut old_changed = vec![false; old.len()];
    let old_recs = Records::new(old, &mut old_changed);
    let mut new_changed = vec![false; new.len()];
    let new_recs = Records::new(new, &mut new_changed);

    // Shared by every level of the recursion, sized for the widest subproblem.
    let max = old.len() + new.len();
    let mut vf = V::new(max);
    let mut vb = V::new(max);

    conquer(old_recs, new_recs, &mut vf, &mut vb);

    (old_changed, new_changed)
}
