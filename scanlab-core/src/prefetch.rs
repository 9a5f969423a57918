//! Prefetch advice
//!
//! Two independent knobs:
//! 1. OS advisory for file-backed buffers ([`advise_sequential`])
//! 2. CPU software prefetch over a [`LookaheadWindow`] during random traversal
//!
//! Neither can change a result value. Both degrade to a no-op where the
//! platform offers nothing.

use std::io;

use log::{debug, info};
use serde::Serialize;

use crate::buffer::Buffer;
use crate::element::Element;

/// Iterations ahead for software prefetch
pub const DEFAULT_LOOKAHEAD: usize = 128;

/// What happened to an OS access-pattern hint
#[derive(Debug)]
pub enum AdviceOutcome {
    /// The kernel accepted the hint
    Applied,
    /// No hint applies (heap buffer, empty mapping or non-unix host)
    Unsupported,
    /// The kernel rejected the hint
    Rejected(io::Error),
}

impl AdviceOutcome {
    /// Whether the hint is in effect
    pub fn is_applied(&self) -> bool {
        matches!(self, AdviceOutcome::Applied)
    }

    /// Short label for report lines
    pub fn label(&self) -> AdviceLabel {
        match self {
            AdviceOutcome::Applied => AdviceLabel::Applied,
            AdviceOutcome::Unsupported => AdviceLabel::Unsupported,
            AdviceOutcome::Rejected(_) => AdviceLabel::Rejected,
        }
    }
}

/// Serializable form of [`AdviceOutcome`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AdviceLabel {
    /// The kernel accepted the hint
    Applied,
    /// No hint applies
    Unsupported,
    /// The kernel rejected the hint
    Rejected,
}

/// Tell the OS the mapped region will be read front to back.
///
/// Best effort: a rejected hint is logged and returned, never raised.
pub fn advise_sequential<T: Element>(buffer: &Buffer<T>) -> AdviceOutcome {
    let Some(map) = buffer.mapping() else {
        debug!("sequential advice skipped: {:?} has no file mapping", buffer);
        return AdviceOutcome::Unsupported;
    };
    let outcome = apply_sequential(map);
    if let AdviceOutcome::Rejected(err) = &outcome {
        info!("sequential advice rejected ({}); scanning without it", err);
    }
    outcome
}

#[cfg(unix)]
fn apply_sequential(map: &memmap2::Mmap) -> AdviceOutcome {
    match map.advise(memmap2::Advice::Sequential) {
        Ok(()) => AdviceOutcome::Applied,
        Err(err) => AdviceOutcome::Rejected(err),
    }
}

#[cfg(not(unix))]
fn apply_sequential(_map: &memmap2::Mmap) -> AdviceOutcome {
    AdviceOutcome::Unsupported
}

/// Ask the CPU to pull `value`'s cache line toward L1.
///
/// Never faults and never blocks; compiles to nothing on architectures
/// without a prefetch instruction.
#[inline(always)]
pub fn prefetch_read<T>(value: &T) {
    let addr = value as *const T;
    #[cfg(target_arch = "x86_64")]
    {
        use core::arch::x86_64::{_MM_HINT_T0, _mm_prefetch};
        // SAFETY: prefetch is a hint and does not dereference the address.
        unsafe { _mm_prefetch::<_MM_HINT_T0>(addr as *const i8) };
    }
    #[cfg(target_arch = "aarch64")]
    {
        // SAFETY: prfm is a hint and does not fault on any address.
        unsafe {
            core::arch::asm!("prfm pldl1keep, [{0}]", in(reg) addr, options(nostack, readonly, preserves_flags));
        }
    }
    #[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
    {
        let _ = addr;
    }
}

/// Ring of the next `L` indices a random traversal will dereference.
///
/// At iteration `i` the window holds the indices for iterations
/// `i .. i+L`; [`LookaheadWindow::rotate`] hands out the one for `i` and
/// stores the index for `i+L` in the freed slot.
#[derive(Debug, Clone)]
pub struct LookaheadWindow {
    slots: Box<[usize]>,
    pos: usize,
}

impl LookaheadWindow {
    /// Fill a window of `distance` slots from `draw`, in draw order.
    ///
    /// A zero distance is bumped to one slot.
    pub fn primed(distance: usize, mut draw: impl FnMut() -> usize) -> Self {
        let slots = (0..distance.max(1)).map(|_| draw()).collect();
        Self { slots, pos: 0 }
    }

    /// Lookahead distance `L`
    pub fn distance(&self) -> usize {
        self.slots.len()
    }

    /// Take the index due now and queue `incoming` `L` iterations out
    #[inline(always)]
    pub fn rotate(&mut self, incoming: usize) -> usize {
        let due = core::mem::replace(&mut self.slots[self.pos], incoming);
        self.pos += 1;
        if self.pos == self.slots.len() {
            self.pos = 0;
        }
        due
    }

    /// Pending indices in the order they will be handed out
    pub fn pending(&self) -> impl Iterator<Item = usize> + '_ {
        self.slots[self.pos..].iter().chain(&self.slots[..self.pos]).copied()
    }
}
