//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value**. Identifiers in
/// this workspace (GSTIN, PAN, return period) are value objects: two
/// instances holding the same characters are the same identifier.
///
/// ## Construction
///
/// Implementors validate in their constructor (`parse`, `new`) and never
/// expose a way to build an invalid instance, so holding a value object is
/// proof that it passed validation.
///
/// ```ignore
/// let period = ReturnPeriod::parse("042024")?;
/// assert_eq!(period, ReturnPeriod::new(4, 2024)?);
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
