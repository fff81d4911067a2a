/*! GF(2^8) arithmetic for the Reed–Solomon coder.

Multiplication runs over precomputed exponent and logarithm tables of
the field generator, so the hot path is two lookups and an addition
mod 255.

[gf]: https://en.wikipedia.org/wiki/Finite_field_arithmetic
*/

/// A GF(2^8) field defined by its primitive polynomial.
pub struct GaloisField {
    exp: [u8; 256],
    log: [u8; 256],
}

impl GaloisField {
    /// Build the tables for the field with the given primitive
    /// polynomial, e.g. `0x11D` for the FX.25 Reed–Solomon code.
    pub fn new(poly: u16) -> GaloisField {
        let mut exp = [0u8; 256];
        let mut log = [0u8; 256];

        let mut value: u16 = 1;
        for (i, e) in exp.iter_mut().take(255).enumerate() {
            *e = value as u8;
            log[value as usize] = i as u8;
            value <<= 1;
            if value & 0x100 != 0 {
                value ^= poly;
            }
        }
        exp[255] = exp[0];

        GaloisField { exp, log }
    }

    /// α^i, with the exponent reduced mod 255.
    pub fn exp(&self, i: usize) -> u8 {
        self.exp[i % 255]
    }

    /// Field multiplication.
    pub fn mul(&self, a: u8, b: u8) -> u8 {
        if a == 0 || b == 0 {
            return 0;
        }
        let sum = (usize::from(self.log[a as usize]) + usize::from(self.log[b as usize])) % 255;
        self.exp[sum]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_basics() {
        let gf = GaloisField::new(0x11D);
        assert_eq!(gf.exp(0), 1);
        assert_eq!(gf.exp(1), 2);
        // x^8 = x^4 + x^3 + x^2 + 1 for poly 0x11D.
        assert_eq!(gf.exp(8), 0x1D);
        // The exponent table wraps: α^255 = α^0.
        assert_eq!(gf.exp(255), 1);
    }

    #[test]
    fn mul_properties() {
        let gf = GaloisField::new(0x11D);
        assert_eq!(gf.mul(0, 0x53), 0);
        assert_eq!(gf.mul(0x53, 0), 0);
        assert_eq!(gf.mul(1, 0x53), 0x53);
        assert_eq!(gf.mul(2, 0x80), 0x1D);
        for a in [1u8, 2, 3, 0x53, 0xCA, 0xFF] {
            for b in [1u8, 7, 0x80, 0xFE] {
                assert_eq!(gf.mul(a, b), gf.mul(b, a));
            }
        }
    }
}
