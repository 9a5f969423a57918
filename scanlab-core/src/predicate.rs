//! Selection predicates
//!
//! Evaluates `value < v` and the conjunction `value < v ∧ value is even`
//! over a column, writing qualifying entries into a [`SelectionVector`].
//! Branch-based and branchless strategies leave identical selected
//! prefixes; they differ only in how often the CPU has to guess.

use serde::Serialize;

use crate::element::Element;

/// Output arena for a selection, sized to the column it is used with.
///
/// Branchless strategies write a candidate into `slots[count]` on every
/// iteration and only advance `count` when the predicate held, so slots
/// past `count` may hold discarded candidates. Only [`selected`] is
/// meaningful.
///
/// [`selected`]: SelectionVector::selected
#[derive(Debug, Clone)]
pub struct SelectionVector<E> {
    slots: Vec<E>,
    count: usize,
}

impl<E: Copy + Default> SelectionVector<E> {
    /// Arena able to hold a selection over `capacity` rows
    pub fn with_capacity(capacity: usize) -> Self {
        Self { slots: vec![E::default(); capacity], count: 0 }
    }

    /// Rows this arena can hold
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// The qualifying entries in scan order
    pub fn selected(&self) -> &[E] {
        &self.slots[..self.count]
    }

    /// Number of qualifying entries
    pub fn len(&self) -> usize {
        self.count
    }

    /// Whether nothing qualified
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    fn reset_for(&mut self, rows: usize) {
        assert!(
            self.slots.len() >= rows,
            "selection vector holds {} rows, column has {}",
            self.slots.len(),
            rows
        );
        self.count = 0;
    }
}

/// Outcome of one selection pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SelectionResult {
    /// Qualifying rows
    pub count: usize,
    /// Rows scanned
    pub total: usize,
}

impl SelectionResult {
    /// Qualifying fraction in `[0, 1]`; zero for an empty column
    pub fn selectivity(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.count as f64 / self.total as f64
        }
    }

    /// Qualifying share in percent
    pub fn percent(&self) -> f64 {
        self.selectivity() * 100.0
    }
}

/// How `value < v` is evaluated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionStrategy {
    /// Write and advance only when the predicate holds
    Branching,
    /// Always write, advance by the predicate's 0/1 value
    Branchless,
}

impl SelectionStrategy {
    /// Run this strategy, emitting qualifying row positions
    #[inline]
    pub fn select_less_than<T: Element>(
        self,
        column: &[T],
        v: T,
        out: &mut SelectionVector<usize>,
    ) -> SelectionResult {
        match self {
            SelectionStrategy::Branching => select_less_than_branching(column, v, out),
            SelectionStrategy::Branchless => select_less_than_branchless(column, v, out),
        }
    }
}

/// `value < v` with a data-dependent branch per row
#[inline(never)]
pub fn select_less_than_branching<T: Element>(
    column: &[T],
    v: T,
    out: &mut SelectionVector<usize>,
) -> SelectionResult {
    out.reset_for(column.len());
    let slots = &mut out.slots[..column.len()];
    let mut count = 0;
    for (i, &value) in column.iter().enumerate() {
        if value < v {
            slots[count] = i;
            count += 1;
        }
    }
    out.count = count;
    SelectionResult { count, total: column.len() }
}

/// `value < v` without a data-dependent branch
#[inline(never)]
pub fn select_less_than_branchless<T: Element>(
    column: &[T],
    v: T,
    out: &mut SelectionVector<usize>,
) -> SelectionResult {
    out.reset_for(column.len());
    let slots = &mut out.slots[..column.len()];
    let mut count = 0;
    for (i, &value) in column.iter().enumerate() {
        // count <= i < len
        slots[count] = i;
        count += (value < v) as usize;
    }
    out.count = count;
    SelectionResult { count, total: column.len() }
}

/// How `value < v ∧ value is even` is evaluated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConjunctionStrategy {
    /// Both predicates folded into the increment
    Branchless,
    /// Branch on the range, parity gates the increment
    OuterRange,
    /// Branch on parity, the range gates the increment
    OuterParity,
}

impl ConjunctionStrategy {
    /// Every strategy, in report column order
    pub const ALL: [ConjunctionStrategy; 3] = [
        ConjunctionStrategy::Branchless,
        ConjunctionStrategy::OuterRange,
        ConjunctionStrategy::OuterParity,
    ];

    /// Run this strategy, emitting qualifying values
    #[inline]
    pub fn select<T: Element>(self, column: &[T], v: T, out: &mut SelectionVector<T>) -> SelectionResult {
        match self {
            ConjunctionStrategy::Branchless => select_conjunction_branchless(column, v, out),
            ConjunctionStrategy::OuterRange => select_conjunction_outer_range(column, v, out),
            ConjunctionStrategy::OuterParity => select_conjunction_outer_parity(column, v, out),
        }
    }
}

/// `(value < v) & even` as the increment; no branch at all
#[inline(never)]
pub fn select_conjunction_branchless<T: Element>(
    column: &[T],
    v: T,
    out: &mut SelectionVector<T>,
) -> SelectionResult {
    out.reset_for(column.len());
    let slots = &mut out.slots[..column.len()];
    let mut count = 0;
    for &value in column {
        slots[count] = value;
        count += ((value < v) & value.is_even()) as usize;
    }
    out.count = count;
    SelectionResult { count, total: column.len() }
}

/// Branch on `value < v`; selectivity decides how predictable it is
#[inline(never)]
pub fn select_conjunction_outer_range<T: Element>(
    column: &[T],
    v: T,
    out: &mut SelectionVector<T>,
) -> SelectionResult {
    out.reset_for(column.len());
    let slots = &mut out.slots[..column.len()];
    let mut count = 0;
    for &value in column {
        if value < v {
            slots[count] = value;
            count += value.is_even() as usize;
        }
    }
    out.count = count;
    SelectionResult { count, total: column.len() }
}

/// Branch on parity; unpredictable on random data at any selectivity
#[inline(never)]
pub fn select_conjunction_outer_parity<T: Element>(
    column: &[T],
    v: T,
    out: &mut SelectionVector<T>,
) -> SelectionResult {
    out.reset_for(column.len());
    let slots = &mut out.slots[..column.len()];
    let mut count = 0;
    for &value in column {
        if value.is_even() {
            slots[count] = value;
            count += (value < v) as usize;
        }
    }
    out.count = count;
    SelectionResult { count, total: column.len() }
}
