//! String objects
//!
//! A string is a byte buffer with an explicit length; it does not need to be
//! valid UTF-8 and may be empty.

use crate::descriptor::TypeKind;
use crate::error::ObjectError;
use crate::object::{typed_handle, Body, ObjectRef};
use std::cmp::Ordering;

typed_handle!(
    /// Handle to a String object
    StringRef,
    TypeKind::String
);

impl StringRef {
    /// Creates an empty string
    pub fn new() -> Self {
        Self(ObjectRef::with_body(Body::String(Vec::new())))
    }

    /// Creates a string holding a copy of `bytes`
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self(ObjectRef::with_body(Body::String(bytes.to_vec())))
    }

    /// Creates a string holding a copy of `text`
    pub fn from_text(text: &str) -> Self {
        Self::from_bytes(text.as_bytes())
    }

    fn with_bytes<R>(&self, f: impl FnOnce(&Vec<u8>) -> R) -> Result<R, ObjectError> {
        match &*self.0.read()? {
            Body::String(bytes) => Ok(f(bytes)),
            _ => Err(ObjectError::TornDown(self.id())),
        }
    }

    /// Returns the length in bytes
    pub fn len(&self) -> Result<usize, ObjectError> {
        self.with_bytes(|bytes| bytes.len())
    }

    /// Checks if the string has no bytes
    pub fn is_empty(&self) -> Result<bool, ObjectError> {
        self.with_bytes(|bytes| bytes.is_empty())
    }

    /// Returns a copy of the content
    pub fn to_bytes(&self) -> Result<Vec<u8>, ObjectError> {
        self.with_bytes(|bytes| bytes.clone())
    }

    /// Returns the content as text, replacing invalid UTF-8
    pub fn to_string_lossy(&self) -> Result<String, ObjectError> {
        self.with_bytes(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }

    /// Appends the content of `src` in place and returns `self`
    ///
    /// `src` may be `self`, in which case the content is doubled. Fails with
    /// [`ObjectError::HeldBySet`] while any set holds `self`.
    pub fn cat(&self, src: &StringRef) -> Result<&Self, ObjectError> {
        let tail = if self.same(src) {
            None
        } else {
            Some(src.to_bytes()?)
        };
        let mut body = self.0.write()?;
        self.0.ensure_mutable()?;
        if let Body::String(bytes) = &mut *body {
            match tail {
                Some(tail) => bytes.extend_from_slice(&tail),
                None => bytes.extend_from_within(..),
            }
        }
        Ok(self)
    }

    /// Creates an independent copy with its own reference count
    pub fn dupl(&self) -> Result<StringRef, ObjectError> {
        Ok(Self::from_bytes(&self.to_bytes()?))
    }

    /// Byte-wise, case-sensitive three-way comparison
    pub fn cmp(&self, other: &StringRef) -> Result<Ordering, ObjectError> {
        self.0.compare(&other.0)
    }
}

impl Default for StringRef {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::STRING_TYPE;

    #[test]
    fn test_new_string_is_empty() {
        let s = StringRef::new();
        assert_eq!(s.len(), Ok(0));
        assert_eq!(s.is_empty(), Ok(true));
        assert_eq!(s.descriptor(), &STRING_TYPE);
    }

    #[test]
    fn test_cat_empty_returns_receiver() {
        let a = StringRef::new();
        let b = StringRef::new();
        let result = a.cat(&b).unwrap();
        assert!(result.same(&a));
        assert_eq!(result.len(), Ok(0));
    }

    #[test]
    fn test_cat_appends() {
        let a = StringRef::from_text("foo");
        let b = StringRef::from_text("bar");
        a.cat(&b).unwrap().cat(&b).unwrap();
        assert_eq!(a.to_string_lossy().unwrap(), "foobarbar");
        assert_eq!(b.to_string_lossy().unwrap(), "bar");
    }

    #[test]
    fn test_cat_with_itself() {
        let a = StringRef::from_text("ab");
        a.cat(&a.clone()).unwrap();
        assert_eq!(a.to_bytes().unwrap(), b"abab");
    }

    #[test]
    fn test_dupl_is_independent() {
        let a = StringRef::new();
        let copy = a.dupl().unwrap();
        assert!(!copy.same(&a));
        assert_eq!(copy.len(), Ok(0));
        assert_eq!(copy.refcount(), 1);

        a.cat(&StringRef::from_text("x")).unwrap();
        assert_eq!(copy.len(), Ok(0));
    }

    #[test]
    fn test_cmp_orders_bytes() {
        assert_eq!(StringRef::new().cmp(&StringRef::new()), Ok(Ordering::Equal));
        let a = StringRef::from_text("abc");
        let b = StringRef::from_text("abd");
        assert_eq!(a.cmp(&b), Ok(Ordering::Less));
        assert_eq!(b.cmp(&a), Ok(Ordering::Greater));
        assert_eq!(
            StringRef::from_text("ab").cmp(&StringRef::from_text("abc")),
            Ok(Ordering::Less)
        );
        // Case-sensitive: 'B' < 'a'
        assert_eq!(
            StringRef::from_text("B").cmp(&StringRef::from_text("a")),
            Ok(Ordering::Less)
        );
    }

    #[test]
    fn test_non_utf8_content() {
        let s = StringRef::from_bytes(&[0xff, 0x00, 0x41]);
        assert_eq!(s.len(), Ok(3));
        assert_eq!(s.to_bytes().unwrap(), vec![0xff, 0x00, 0x41]);
    }

    #[test]
    fn test_equal_strings_hash_equal() {
        let a = StringRef::from_text("same");
        let b = StringRef::from_text("same");
        assert_eq!(a.hash(), b.hash());
        assert!(a.equals(&b));
    }

    #[test]
    fn test_try_from_checks_type() {
        let raw = ObjectRef::new_raw();
        assert!(matches!(
            StringRef::try_from(raw),
            Err(ObjectError::TypeMismatch {
                expected: "String",
                found: "Object",
            })
        ));

        let object: ObjectRef = StringRef::from_text("x").into();
        assert!(StringRef::try_from(object).is_ok());
    }

    #[test]
    fn test_torn_down_string() {
        let s = StringRef::from_text("gone");
        assert_eq!(s.deinit(), Ok(true));
        assert_eq!(s.len(), Err(ObjectError::TornDown(s.id())));
        assert!(s.cat(&StringRef::new()).is_err());
    }
}
