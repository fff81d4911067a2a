/*! Systematic Reed–Solomon encoder over GF(2^8).

The parity symbols are the remainder of `data(x)·x^parity` divided by
the generator polynomial, computed LFSR-style one data byte at a time.
The parameters are the FX.25 ones: field polynomial `0x11D`, first
consecutive root 1, primitive element 1.

Only encoding is implemented. Error correction on receive belongs to
the FX.25 decode path, which is not part of this revision.

[rs]: https://en.wikipedia.org/wiki/Reed%E2%80%93Solomon_error_correction
*/
use crate::gf::GaloisField;

const FIELD_POLY: u16 = 0x11D;
const FCR: usize = 1;

/// A Reed–Solomon encoder producing a fixed number of parity symbols.
pub struct ReedSolomon {
    gf: GaloisField,
    // Monic generator polynomial, highest degree coefficient first.
    generator: Vec<u8>,
}

impl ReedSolomon {
    /// Create an encoder with `parity` check symbols. The generator
    /// polynomial is `(x + α^1)(x + α^2)…(x + α^parity)`.
    pub fn new(parity: usize) -> ReedSolomon {
        let gf = GaloisField::new(FIELD_POLY);

        let mut generator = vec![1u8];
        for i in 0..parity {
            let root = gf.exp(FCR + i);
            let mut next = vec![0u8; generator.len() + 1];
            for (j, &g) in generator.iter().enumerate() {
                next[j] ^= g;
                next[j + 1] ^= gf.mul(g, root);
            }
            generator = next;
        }

        ReedSolomon { gf, generator }
    }

    /// Number of parity symbols this encoder produces.
    pub fn parity(&self) -> usize {
        self.generator.len() - 1
    }

    /// Compute the parity symbols for `data`. The codeword is
    /// `data || parity`.
    pub fn encode(&self, data: &[u8]) -> Vec<u8> {
        let nroots = self.parity();
        let mut rem = vec![0u8; nroots];

        for &d in data {
            let feedback = d ^ rem[0];
            rem.rotate_left(1);
            rem[nroots - 1] = 0;
            if feedback != 0 {
                for (r, &g) in rem.iter_mut().zip(&self.generator[1..]) {
                    *r ^= self.gf.mul(feedback, g);
                }
            }
        }
        rem
    }
}
