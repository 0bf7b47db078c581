//! Declarative required-field validation.
//!
//! Types describe their constraints through [`Validate`], listing one
//! [`FieldCheck`] per constrained field in declaration order. A
//! [`Verifier`] turns failed checks into a single human-readable message.

/// Constraint applied to a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// The field must hold a non-zero value.
    Required,
}

/// Outcome of evaluating one rule against one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldCheck {
    pub field: &'static str,
    pub rule: Rule,
    pub satisfied: bool,
}

impl FieldCheck {
    pub fn required<V: Presence + ?Sized>(
        field: &'static str,
        value: &V,
    ) -> Self {
        Self {
            field,
            rule: Rule::Required,
            satisfied: value.is_present(),
        }
    }
}

/// Whether a value differs from its zero value.
pub trait Presence {
    fn is_present(&self) -> bool;
}

impl Presence for str {
    fn is_present(&self) -> bool {
        !self.is_empty()
    }
}

impl Presence for String {
    fn is_present(&self) -> bool {
        !self.is_empty()
    }
}

impl Presence for bool {
    fn is_present(&self) -> bool {
        *self
    }
}

impl Presence for f64 {
    fn is_present(&self) -> bool {
        *self != 0.0
    }
}

macro_rules! integer_presence {
    ($($ty:ty),*) => {
        $(
            impl Presence for $ty {
                fn is_present(&self) -> bool {
                    *self != 0
                }
            }
        )*
    };
}

integer_presence!(i32, i64, u32, u64, usize);

impl<T> Presence for Option<T> {
    fn is_present(&self) -> bool {
        self.is_some()
    }
}

impl<T> Presence for Vec<T> {
    fn is_present(&self) -> bool {
        !self.is_empty()
    }
}

/// A value with declared field constraints.
pub trait Validate {
    /// Evaluate every constraint, in field declaration order.
    fn checks(&self) -> Vec<FieldCheck>;
}

impl<T: Validate + ?Sized> Validate for &T {
    fn checks(&self) -> Vec<FieldCheck> {
        (**self).checks()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VerifyError {
    #[error("struct is nil")]
    NilTarget,

    #[error("{0}")]
    Invalid(String),
}

/// Validation service handed to whatever needs to check its inputs.
#[derive(Debug, Clone, Copy, Default)]
pub struct Verifier;

impl Verifier {
    pub fn new() -> Self {
        Self
    }

    /// Check every constraint on `value`, reporting all violated fields.
    pub fn check_struct(
        &self,
        value: Option<&dyn Validate>,
    ) -> Result<(), VerifyError> {
        let value = value.ok_or(VerifyError::NilTarget)?;

        let mut errs = String::new();
        for check in value.checks().iter().filter(|c| !c.satisfied) {
            errs.push_str(&self.message(check));
            errs.push('\n');
        }

        if errs.is_empty() {
            Ok(())
        } else {
            Err(VerifyError::Invalid(errs.to_lowercase()))
        }
    }

    /// Check each element in order and stop at the first invalid one.
    pub fn check_slice(
        &self,
        values: Option<&[&dyn Validate]>,
    ) -> Result<(), VerifyError> {
        let values = values.ok_or(VerifyError::NilTarget)?;
        for value in values {
            self.check_struct(Some(*value))?;
        }
        Ok(())
    }

    pub fn check<T: Validate>(&self, value: &T) -> Result<(), VerifyError> {
        self.check_struct(Some(value))
    }

    pub fn check_all<T: Validate>(
        &self,
        values: &[T],
    ) -> Result<(), VerifyError> {
        let refs: Vec<&dyn Validate> =
            values.iter().map(|v| v as &dyn Validate).collect();
        self.check_slice(Some(&refs))
    }

    fn message(&self, check: &FieldCheck) -> String {
        match check.rule {
            Rule::Required => format!("{} is not valid", check.field),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Named {
        name: String,
    }

    impl Validate for Named {
        fn checks(&self) -> Vec<FieldCheck> {
            vec![FieldCheck::required("Name", &self.name)]
        }
    }

    struct Person {
        name: String,
        age: i64,
    }

    impl Validate for Person {
        fn checks(&self) -> Vec<FieldCheck> {
            vec![
                FieldCheck::required("Name", &self.name),
                FieldCheck::required("Age", &self.age),
            ]
        }
    }

    struct Aged {
        age: i64,
    }

    impl Validate for Aged {
        fn checks(&self) -> Vec<FieldCheck> {
            vec![FieldCheck::required("Age", &self.age)]
        }
    }

    fn named(name: &str) -> Named {
        Named {
            name: name.to_string(),
        }
    }

    #[test]
    fn struct_nil_target() {
        let v = Verifier::new();
        assert_eq!(v.check_struct(None), Err(VerifyError::NilTarget));
        assert_eq!(VerifyError::NilTarget.to_string(), "struct is nil");
    }

    #[test]
    fn struct_valid() {
        let v = Verifier::new();
        assert!(v.check(&named("test")).is_ok());
    }

    #[test]
    fn struct_single_violation() {
        let err = Verifier::new().check(&named("")).unwrap_err();
        assert_eq!(err.to_string(), "name is not valid\n");
    }

    #[test]
    fn struct_aggregates_in_declaration_order() {
        let person = Person {
            name: String::new(),
            age: 0,
        };
        let err = Verifier::new().check(&person).unwrap_err();
        assert_eq!(err.to_string(), "name is not valid\nage is not valid\n");
    }

    #[test]
    fn struct_reports_only_failed_fields() {
        let person = Person {
            name: "ada".to_string(),
            age: 0,
        };
        let err = Verifier::new().check(&person).unwrap_err();
        assert_eq!(err.to_string(), "age is not valid\n");
    }

    #[test]
    fn slice_nil_target() {
        let v = Verifier::new();
        assert_eq!(v.check_slice(None), Err(VerifyError::NilTarget));
    }

    #[test]
    fn slice_valid() {
        let v = Verifier::new();
        assert!(v.check_all(&[named("test"), named("test")]).is_ok());
    }

    #[test]
    fn slice_stops_at_first_failure() {
        let err = Verifier::new()
            .check_all(&[named(""), named("")])
            .unwrap_err();
        assert_eq!(err.to_string(), "name is not valid\n");
    }

    #[test]
    fn slice_mixed_shapes() {
        let first = named("test");
        let second = Aged { age: 0 };
        let values: [&dyn Validate; 2] = [&first, &second];
        let err = Verifier::new().check_slice(Some(&values)).unwrap_err();
        assert_eq!(err.to_string(), "age is not valid\n");
    }

    #[test]
    fn slice_empty_is_valid() {
        let values: [&dyn Validate; 0] = [];
        assert!(Verifier::new().check_slice(Some(&values)).is_ok());
    }

    #[test]
    fn presence_of_zero_values() {
        assert!(!"".is_present());
        assert!(!0_u64.is_present());
        assert!(!None::<u8>.is_present());
        assert!(!Vec::<u8>::new().is_present());
        assert!(!false.is_present());
        assert!("x".is_present());
        assert!(Some(0).is_present());
    }
}
