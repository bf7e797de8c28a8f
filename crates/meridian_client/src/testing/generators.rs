use meridian_abi::{ABIType, ABIValue};
use meridian_transact::Address;
use num_bigint::BigUint;
use rand::{Rng, RngCore, SeedableRng, rngs::StdRng};

const STRING_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789 ";

/// A pure generator of typed values, independent of any global random state.
///
/// Seeded explicitly so generated inputs are reproducible across runs.
pub struct ValueGenerator {
    rng: StdRng,
}

impl ValueGenerator {
    pub fn new(seed: u64) -> Self {
        ValueGenerator {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// A string of length at most `max_len`.
    pub fn string(&mut self, max_len: usize) -> String {
        let len = self.rng.gen_range(0..=max_len);
        (0..len)
            .map(|_| {
                let index = self.rng.gen_range(0..STRING_CHARSET.len());
                STRING_CHARSET[index] as char
            })
            .collect()
    }

    /// An unsigned integer fitting in `bit_size` bits.
    pub fn uint(&mut self, bit_size: u16) -> BigUint {
        let mut bytes = vec![0u8; (bit_size / 8) as usize];
        self.rng.fill_bytes(&mut bytes);
        BigUint::from_bytes_be(&bytes)
    }

    pub fn bool(&mut self) -> bool {
        self.rng.gen_range(0..2) == 1
    }

    pub fn byte(&mut self) -> u8 {
        let mut byte = [0u8; 1];
        self.rng.fill_bytes(&mut byte);
        byte[0]
    }

    pub fn address(&mut self) -> String {
        let mut pub_key = [0u8; 32];
        self.rng.fill_bytes(&mut pub_key);
        Address(pub_key).as_str()
    }

    /// A value of the declared type, with dynamic lengths bounded by
    /// `max_len`.
    pub fn value_of(&mut self, abi_type: &ABIType, max_len: usize) -> ABIValue {
        match abi_type {
            ABIType::Bool => ABIValue::Bool(self.bool()),
            ABIType::Byte => ABIValue::Byte(self.byte()),
            ABIType::Uint(bit_size) => ABIValue::Uint(self.uint(bit_size.value())),
            ABIType::String => ABIValue::String(self.string(max_len)),
            ABIType::Address => ABIValue::Address(self.address()),
            ABIType::StaticArray(child_type, size) => ABIValue::Array(
                (0..*size)
                    .map(|_| self.value_of(child_type, max_len))
                    .collect(),
            ),
            ABIType::DynamicArray(child_type) => {
                let len = self.rng.gen_range(0..=max_len);
                ABIValue::Array((0..len).map(|_| self.value_of(child_type, max_len)).collect())
            }
            ABIType::Tuple(child_types) => ABIValue::Array(
                child_types
                    .iter()
                    .map(|child| self.value_of(child, max_len))
                    .collect(),
            ),
        }
    }
}
