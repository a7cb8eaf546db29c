//! Strong handles for host-mesh entities.
//!
//! Host solvers number nodes and elements from 1, so `NodeId` and
//! `ElementId` wrap a `NonZeroU64` and reserve 0 as invalid. Element faces
//! are addressed by an `(element, local face)` pair, which the host also
//! encodes as a single integer `element * 10 + face` inside face sets.

use std::{fmt, num::NonZeroU64};

use serde::{Deserialize, Serialize};

use crate::adapter_error::AdapterError;

macro_rules! one_based_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[repr(transparent)]
        pub struct $name(NonZeroU64);

        impl $name {
            /// Creates a handle from the host's 1-based number.
            ///
            /// # Panics
            ///
            /// Panics if `raw == 0`.
            #[inline]
            pub fn new(raw: u64) -> Self {
                Self::try_new(raw).expect(concat!($label, " number must be non-zero"))
            }

            /// Fallible constructor, `None` for 0.
            #[inline]
            pub fn try_new(raw: u64) -> Option<Self> {
                NonZeroU64::new(raw).map(Self)
            }

            /// Returns the host's 1-based number.
            #[inline]
            pub const fn get(self) -> u64 {
                self.0.get()
            }

            /// Zero-based position in host arrays.
            #[inline]
            pub const fn index(self) -> usize {
                (self.0.get() - 1) as usize
            }

            /// Handle for the zero-based array position `index`.
            #[inline]
            pub fn from_index(index: usize) -> Self {
                Self::new(index as u64 + 1)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_tuple(stringify!($name)).field(&self.get()).finish()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.get())
            }
        }
    };
}

one_based_id!(
    /// 1-based host node number.
    NodeId,
    "node"
);

one_based_id!(
    /// 1-based host element number.
    ElementId,
    "element"
);

/// One face of one element: the unit of face-based coupling regions.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FaceRef {
    element: ElementId,
    face: u8,
}

impl FaceRef {
    /// Largest local face number expressible in the `element * 10 + face` encoding.
    pub const MAX_LOCAL_FACE: u8 = 9;

    /// Builds a face reference, validating the local face number (1-based).
    pub fn new(element: ElementId, face: u8) -> Result<Self, AdapterError> {
        if face == 0 || face > Self::MAX_LOCAL_FACE {
            return Err(AdapterError::InvalidLocalFace { element, face });
        }
        Ok(Self { element, face })
    }

    /// Decodes the host face-set encoding `element * 10 + face`.
    pub fn decode(code: u64) -> Result<Self, AdapterError> {
        let element = ElementId::try_new(code / 10)
            .ok_or_else(|| AdapterError::InvalidConfig(format!("face code {code} has no element")))?;
        Self::new(element, (code % 10) as u8)
    }

    /// Host face-set encoding of this face.
    #[inline]
    pub fn encode(self) -> u64 {
        self.element.get() * 10 + u64::from(self.face)
    }

    /// Owning element.
    #[inline]
    pub fn element(self) -> ElementId {
        self.element
    }

    /// 1-based local face number.
    #[inline]
    pub fn local_face(self) -> u8 {
        self.face
    }
}

impl fmt::Debug for FaceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("FaceRef")
            .field(&self.element.get())
            .field(&self.face)
            .finish()
    }
}

impl fmt::Display for FaceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "element {} face {}", self.element, self.face)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_rejected() {
        assert!(NodeId::try_new(0).is_none());
        assert!(std::panic::catch_unwind(|| ElementId::new(0)).is_err());
    }

    #[test]
    fn index_is_zero_based() {
        let n = NodeId::new(5);
        assert_eq!(n.index(), 4);
        assert_eq!(NodeId::from_index(4), n);
    }

    #[test]
    fn debug_and_display() {
        let n = NodeId::new(7);
        assert_eq!(format!("{n:?}"), "NodeId(7)");
        assert_eq!(format!("{n}"), "7");
        let f = FaceRef::new(ElementId::new(12), 3).unwrap();
        assert_eq!(format!("{f:?}"), "FaceRef(12, 3)");
        assert_eq!(format!("{f}"), "element 12 face 3");
    }

    #[test]
    fn face_code_round_trip() {
        let f = FaceRef::decode(1234).unwrap();
        assert_eq!(f.element().get(), 123);
        assert_eq!(f.local_face(), 4);
        assert_eq!(f.encode(), 1234);
    }

    #[test]
    fn face_code_without_face_fails() {
        let err = FaceRef::decode(120).unwrap_err();
        assert!(matches!(err, AdapterError::InvalidLocalFace { face: 0, .. }));
        assert!(FaceRef::decode(7).is_err());
    }

    #[test]
    fn serde_json_transparent() {
        let n = NodeId::new(42);
        let s = serde_json::to_string(&n).unwrap();
        assert_eq!(s, "42");
        let back: NodeId = serde_json::from_str(&s).unwrap();
        assert_eq!(back, n);
    }
}
