//! Portable order-preserving encodings for index field values.

/// A value with a byte encoding whose lexicographic order matches the
/// value's natural order.
///
/// Integers and floats encode to a fixed width, so they can be placed in any
/// field of a composite key. Strings and byte slices encode raw and only
/// compare correctly as the last field or against values of the same length.
pub trait OrderedKey {
    /// Appends the encoding to `out`.
    fn write_ordered(&self, out: &mut Vec<u8>);

    /// Returns the encoding as a fresh buffer.
    fn to_ordered_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.write_ordered(&mut out);
        out
    }
}

macro_rules! ordered_unsigned {
    ($($t:ty),*) => {$(
        impl OrderedKey for $t {
            fn write_ordered(&self, out: &mut Vec<u8>) {
                out.extend_from_slice(&self.to_be_bytes());
            }
        }
    )*};
}

macro_rules! ordered_signed {
    ($($t:ty => $u:ty),*) => {$(
        impl OrderedKey for $t {
            #[allow(clippy::cast_sign_loss)]
            fn write_ordered(&self, out: &mut Vec<u8>) {
                let flipped = (*self as $u) ^ (1 << (<$u>::BITS - 1));
                out.extend_from_slice(&flipped.to_be_bytes());
            }
        }
    )*};
}

ordered_unsigned!(u8, u16, u32, u64, u128);
ordered_signed!(i8 => u8, i16 => u16, i32 => u32, i64 => u64, i128 => u128);

// Pointer-sized integers always take eight bytes so keys move between hosts.
impl OrderedKey for usize {
    fn write_ordered(&self, out: &mut Vec<u8>) {
        (*self as u64).write_ordered(out);
    }
}

impl OrderedKey for isize {
    fn write_ordered(&self, out: &mut Vec<u8>) {
        (*self as i64).write_ordered(out);
    }
}

impl OrderedKey for f64 {
    fn write_ordered(&self, out: &mut Vec<u8>) {
        let bits = self.to_bits();
        let ordered = if bits >> 63 == 1 { !bits } else { bits ^ (1 << 63) };
        out.extend_from_slice(&ordered.to_be_bytes());
    }
}

impl OrderedKey for f32 {
    fn write_ordered(&self, out: &mut Vec<u8>) {
        let bits = self.to_bits();
        let ordered = if bits >> 31 == 1 { !bits } else { bits ^ (1 << 31) };
        out.extend_from_slice(&ordered.to_be_bytes());
    }
}

impl OrderedKey for bool {
    fn write_ordered(&self, out: &mut Vec<u8>) {
        out.push(u8::from(*self));
    }
}

impl OrderedKey for str {
    fn write_ordered(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(self.as_bytes());
    }
}

impl OrderedKey for String {
    fn write_ordered(&self, out: &mut Vec<u8>) {
        self.as_str().write_ordered(out);
    }
}

impl OrderedKey for [u8] {
    fn write_ordered(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(self);
    }
}

impl OrderedKey for Vec<u8> {
    fn write_ordered(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(self);
    }
}

impl<T: OrderedKey + ?Sized> OrderedKey for &T {
    fn write_ordered(&self, out: &mut Vec<u8>) {
        (**self).write_ordered(out);
    }
}
