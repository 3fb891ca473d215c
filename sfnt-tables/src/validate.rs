//! The pre-serialization validation pass

use std::fmt::{Debug, Display};

/// Pre-serialization validation of tables.
///
/// Some requirements of the binary format are awkward to encode in the type
/// system, such as 16-bit length fields or arrays that must agree in length.
/// These are checked here before any bytes are written.
pub trait Validate {
    /// Ensure that this table is well-formed, reporting any errors.
    fn validate(&self) -> Result<(), ValidationReport> {
        let mut ctx = ValidationCtx::default();
        self.validate_impl(&mut ctx);
        if ctx.errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationReport { errors: ctx.errors })
        }
    }

    /// Validate this table.
    ///
    /// Implementations look something like:
    ///
    /// ```rust
    /// # use sfnt_tables::validate::{Validate, ValidationCtx};
    /// struct MyRecord {
    ///     my_values: Vec<u16>,
    /// }
    ///
    /// impl Validate for MyRecord {
    ///     fn validate_impl(&self, ctx: &mut ValidationCtx) {
    ///         ctx.in_table("MyRecord", |ctx| {
    ///             ctx.in_field("my_values", |ctx| {
    ///                 if self.my_values.len() > (u16::MAX as usize) {
    ///                     ctx.report("array is too long");
    ///                 }
    ///             })
    ///         })
    ///     }
    /// }
    /// ```
    fn validate_impl(&self, ctx: &mut ValidationCtx);
}

/// A context for collecting validation errors.
///
/// This tracks the position in the table at which a given error is reported.
#[derive(Clone, Debug, Default)]
pub struct ValidationCtx {
    cur_location: Vec<LocationElem>,
    errors: Vec<ValidationError>,
}

#[derive(Debug, Clone)]
struct ValidationError {
    error: String,
    location: Vec<LocationElem>,
}

/// One or more validation errors.
#[derive(Clone)]
pub struct ValidationReport {
    errors: Vec<ValidationError>,
}

#[derive(Debug, Clone)]
enum LocationElem {
    Table(&'static str),
    Field(&'static str),
    Index(usize),
}

impl ValidationCtx {
    /// Run the provided closure in the context of a new table.
    pub fn in_table(&mut self, name: &'static str, f: impl FnOnce(&mut ValidationCtx)) {
        self.with_elem(LocationElem::Table(name), f);
    }

    /// Run the provided closure in the context of a new field.
    pub fn in_field(&mut self, name: &'static str, f: impl FnOnce(&mut ValidationCtx)) {
        self.with_elem(LocationElem::Field(name), f);
    }

    /// Run the provided closure in the context of one item of an array.
    pub fn in_item(&mut self, idx: usize, f: impl FnOnce(&mut ValidationCtx)) {
        self.with_elem(LocationElem::Index(idx), f);
    }

    /// Report a new error, associating it with the current path.
    pub fn report(&mut self, msg: impl Display) {
        self.errors.push(ValidationError {
            location: self.cur_location.clone(),
            error: msg.to_string(),
        });
    }

    fn with_elem(&mut self, elem: LocationElem, f: impl FnOnce(&mut ValidationCtx)) {
        self.cur_location.push(elem);
        f(self);
        self.cur_location.pop();
    }
}

impl ValidationReport {
    /// The number of errors in this report.
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}

impl Display for ValidationReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let [only] = self.errors.as_slice() {
            return writeln!(f, "Validation error:\n{only}");
        }

        writeln!(f, "{} validation errors:", self.errors.len())?;
        for (i, error) in self.errors.iter().enumerate() {
            writeln!(f, "#{}\n{error}", i + 1)?;
        }
        Ok(())
    }
}

impl Debug for ValidationReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        <Self as Display>::fmt(self, f)
    }
}

impl std::error::Error for ValidationReport {}

impl Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "\"{}\"", self.error)?;
        write!(f, "in: ")?;
        for (i, elem) in self.location.iter().enumerate() {
            match elem {
                LocationElem::Table(name) if i == 0 => write!(f, "{name}"),
                LocationElem::Table(name) => write!(f, " > {name}"),
                LocationElem::Field(name) => write!(f, ".{name}"),
                LocationElem::Index(idx) => write!(f, "[{idx}]"),
            }?;
        }
        writeln!(f)
    }
}

impl<T: Validate> Validate for Option<T> {
    fn validate_impl(&self, ctx: &mut ValidationCtx) {
        if let Some(t) = self {
            t.validate_impl(ctx)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Lengths(Vec<u16>, Vec<u16>);

    impl Validate for Lengths {
        fn validate_impl(&self, ctx: &mut ValidationCtx) {
            ctx.in_table("Lengths", |ctx| {
                ctx.in_field("second", |ctx| {
                    if self.0.len() != self.1.len() {
                        ctx.report("arrays must have equal length");
                    }
                    for (i, val) in self.1.iter().enumerate() {
                        ctx.in_item(i, |ctx| {
                            if *val == 0 {
                                ctx.report("zero is not allowed");
                            }
                        })
                    }
                })
            })
        }
    }

    #[test]
    fn collects_errors_with_location() {
        assert!(Lengths(vec![1], vec![1]).validate().is_ok());
        let report = Lengths(vec![1], vec![1, 0]).validate().unwrap_err();
        assert_eq!(report.len(), 2);
        let text = report.to_string();
        assert!(text.contains("arrays must have equal length"), "{text}");
        assert!(text.contains("in: Lengths.second[1]"), "{text}");
    }
}
