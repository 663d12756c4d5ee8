/// A register of unsigned 64-bit lanes with the operations the Collatz group
/// kernel needs.
///
/// Masks are full vectors whose lanes are either all ones or all zeros.
/// Every method wraps a target-specific intrinsic, so callers must only use an
/// implementation on a CPU that supports its instruction set.
pub trait LaneVector: Copy {
    /// Number of `u64` lanes in one register.
    const LANES: usize;

    /// Broadcasts `value` to every lane.
    ///
    /// # Safety
    ///
    /// The CPU must support the implementation's instruction set.
    unsafe fn splat(value: u64) -> Self;

    /// Loads `LANES` values from the front of `lanes`.
    ///
    /// # Safety
    ///
    /// `lanes.len() >= Self::LANES` and the instruction set is available.
    unsafe fn load(lanes: &[u64]) -> Self;

    /// Stores all lanes into the front of `out`.
    ///
    /// # Safety
    ///
    /// `out.len() >= Self::LANES` and the instruction set is available.
    unsafe fn store(self, out: &mut [u64]);

    /// Lane-wise wrapping addition.
    ///
    /// # Safety
    ///
    /// The CPU must support the implementation's instruction set.
    unsafe fn add(self, rhs: Self) -> Self;

    /// # Safety
    ///
    /// The CPU must support the implementation's instruction set.
    unsafe fn and(self, rhs: Self) -> Self;

    /// # Safety
    ///
    /// The CPU must support the implementation's instruction set.
    unsafe fn or(self, rhs: Self) -> Self;

    /// `self & !mask`.
    ///
    /// # Safety
    ///
    /// The CPU must support the implementation's instruction set.
    unsafe fn and_not(self, mask: Self) -> Self;

    /// Unsigned `self > rhs` as a lane mask.
    ///
    /// # Safety
    ///
    /// The CPU must support the implementation's instruction set.
    unsafe fn gt(self, rhs: Self) -> Self;

    /// `self == rhs` as a lane mask.
    ///
    /// # Safety
    ///
    /// The CPU must support the implementation's instruction set.
    unsafe fn eq(self, rhs: Self) -> Self;

    /// Logical shift right by one.
    ///
    /// # Safety
    ///
    /// The CPU must support the implementation's instruction set.
    unsafe fn shr1(self) -> Self;

    /// Shift left by one.
    ///
    /// # Safety
    ///
    /// The CPU must support the implementation's instruction set.
    unsafe fn shl1(self) -> Self;

    /// Picks `if_set` where `mask` is set and `if_clear` elsewhere.
    ///
    /// # Safety
    ///
    /// The CPU must support the implementation's instruction set.
    unsafe fn select(mask: Self, if_set: Self, if_clear: Self) -> Self;

    /// `true` if any lane of the mask is set.
    ///
    /// # Safety
    ///
    /// The CPU must support the implementation's instruction set.
    unsafe fn any(self) -> bool;
}
