//! Fixed-width index keys.
//!
//! An internal page stores keys inline in its slot array, so every key type
//! has one encoded width known at compile time.

use std::fmt;

/// A key that can be stored in a B+tree page slot.
///
/// `encode_to` and `decode_from` only see the key's own
/// `ENCODED_SIZE` bytes of the slot.
pub trait IndexKey: Copy {
    /// Bytes occupied by one encoded key.
    const ENCODED_SIZE: usize;

    fn encode_to(&self, out: &mut [u8]);

    fn decode_from(bytes: &[u8]) -> Self;
}

macro_rules! impl_index_key_for_int {
    ($($t:ty),*) => {
        $(
            impl IndexKey for $t {
                const ENCODED_SIZE: usize = std::mem::size_of::<$t>();

                #[inline]
                fn encode_to(&self, out: &mut [u8]) {
                    out[..Self::ENCODED_SIZE].copy_from_slice(&self.to_le_bytes());
                }

                #[inline]
                fn decode_from(bytes: &[u8]) -> Self {
                    let mut buf = [0u8; std::mem::size_of::<$t>()];
                    buf.copy_from_slice(&bytes[..Self::ENCODED_SIZE]);
                    <$t>::from_le_bytes(buf)
                }
            }
        )*
    };
}

impl_index_key_for_int!(u32, u64, i32, i64);

/// An opaque `N`-byte key ordered bytewise.
///
/// Shorter inputs are zero-padded, longer ones truncated. Integers go in
/// through [`GenericKey::from_integer`], which keeps byte order equal to
/// numeric order.
///
/// ```
/// use pagetree::index::btree::GenericKey;
///
/// let a = GenericKey::<8>::from_integer(-5);
/// let b = GenericKey::<8>::from_integer(3);
/// assert!(a < b);
/// assert_eq!(a.to_integer(), -5);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GenericKey<const N: usize> {
    data: [u8; N],
}

impl<const N: usize> GenericKey<N> {
    /// Key with every byte zero.
    pub fn zeroed() -> Self {
        Self { data: [0u8; N] }
    }

    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut data = [0u8; N];
        let len = bytes.len().min(N);
        data[..len].copy_from_slice(&bytes[..len]);
        Self { data }
    }

    /// Big-endian with the sign bit flipped, so negatives sort first.
    ///
    /// # Panics
    /// Panics if `N < 8`.
    pub fn from_integer(value: i64) -> Self {
        assert!(N >= 8, "GenericKey<{}> cannot hold an i64", N);
        let encoded = ((value as u64) ^ (1u64 << 63)).to_be_bytes();
        Self::from_bytes(&encoded)
    }

    /// Inverse of [`GenericKey::from_integer`].
    pub fn to_integer(&self) -> i64 {
        assert!(N >= 8, "GenericKey<{}> cannot hold an i64", N);
        let mut buf = [0u8; 8];
        buf.copy_from_slice(&self.data[..8]);
        (u64::from_be_bytes(buf) ^ (1u64 << 63)) as i64
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}

impl<const N: usize> Default for GenericKey<N> {
    fn default() -> Self {
        Self::zeroed()
    }
}

impl<const N: usize> IndexKey for GenericKey<N> {
    const ENCODED_SIZE: usize = N;

    #[inline]
    fn encode_to(&self, out: &mut [u8]) {
        out[..N].copy_from_slice(&self.data);
    }

    #[inline]
    fn decode_from(bytes: &[u8]) -> Self {
        Self::from_bytes(&bytes[..N])
    }
}

impl<const N: usize> fmt::Display for GenericKey<N> {
    /// Printable ASCII shows as text (trailing zero padding dropped),
    /// anything else as hex.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let end = self
            .data
            .iter()
            .rposition(|&b| b != 0)
            .map_or(0, |pos| pos + 1);
        let bytes = &self.data[..end];

        if bytes.iter().all(|b| b.is_ascii_graphic() || *b == b' ') {
            // All ASCII, so this cannot fail
            f.write_str(std::str::from_utf8(bytes).unwrap_or_default())
        } else {
            f.write_str("0x")?;
            for b in &self.data {
                write!(f, "{:02x}", b)?;
            }
            Ok(())
        }
    }
}

impl<const N: usize> fmt::Debug for GenericKey<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GenericKey<{}>({})", N, self)
    }
}
