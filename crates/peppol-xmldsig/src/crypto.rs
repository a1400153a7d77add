#![forbid(unsafe_code)]

//! Digest and signature primitives, dispatched by XML-DSig algorithm
//! URI. RSA PKCS#1 v1.5 with SHA-1/256/384/512 and ECDSA P-256 with
//! SHA-256 cover the signature suites SMP responders use in practice.

use der::Encode;
use p256::pkcs8::DecodePrivateKey as _;
use peppol_common::{algorithm, VerificationError};
use rsa::pkcs8::DecodePublicKey as _;
use sha1::Sha1;
use sha2::{Digest, Sha256, Sha384, Sha512};

/// Compute a digest named by its XML-DSig algorithm URI.
pub fn digest(algorithm_uri: &str, data: &[u8]) -> Result<Vec<u8>, VerificationError> {
    match algorithm_uri {
        algorithm::SHA1 => Ok(Sha1::digest(data).to_vec()),
        algorithm::SHA256 => Ok(Sha256::digest(data).to_vec()),
        algorithm::SHA384 => Ok(Sha384::digest(data).to_vec()),
        algorithm::SHA512 => Ok(Sha512::digest(data).to_vec()),
        other => Err(VerificationError::UnsupportedAlgorithm(other.to_owned())),
    }
}

/// A signature-verification key extracted from an X.509 certificate.
pub enum PublicKey {
    Rsa(rsa::RsaPublicKey),
    EcP256(p256::ecdsa::VerifyingKey),
}

impl PublicKey {
    /// Pull the subject public key out of a certificate.
    pub fn from_certificate(cert: &x509_cert::Certificate) -> Result<Self, VerificationError> {
        let spki = cert
            .tbs_certificate
            .subject_public_key_info
            .to_der()
            .map_err(|e| VerificationError::Certificate(e.to_string()))?;
        if let Ok(key) = rsa::RsaPublicKey::from_public_key_der(&spki) {
            return Ok(Self::Rsa(key));
        }
        if let Ok(key) = p256::ecdsa::VerifyingKey::from_public_key_der(&spki) {
            return Ok(Self::EcP256(key));
        }
        Err(VerificationError::Certificate(
            "unsupported subject public key type".to_owned(),
        ))
    }

    /// Verify `signature` over `data` using the signature algorithm
    /// named by its URI.
    pub fn verify(
        &self,
        signature_uri: &str,
        data: &[u8],
        signature: &[u8],
    ) -> Result<(), VerificationError> {
        match (self, signature_uri) {
            (Self::Rsa(key), _) => {
                let (padding, hashed) = rsa_padding(signature_uri, data)?;
                key.verify(padding, &hashed, signature)
                    .map_err(|_| VerificationError::SignatureInvalid)
            }
            (Self::EcP256(key), algorithm::ECDSA_SHA256) => {
                use signature::Verifier;
                // XML-DSig encodes ECDSA signatures as raw r||s.
                let sig = p256::ecdsa::Signature::from_slice(signature)
                    .map_err(|e| VerificationError::Crypto(e.to_string()))?;
                key.verify(data, &sig)
                    .map_err(|_| VerificationError::SignatureInvalid)
            }
            (Self::EcP256(_), other) => {
                Err(VerificationError::UnsupportedAlgorithm(other.to_owned()))
            }
        }
    }
}

/// A signing key, decoded from PKCS#8 DER.
pub enum SigningKey {
    Rsa(rsa::RsaPrivateKey),
    EcP256(p256::ecdsa::SigningKey),
}

impl SigningKey {
    pub fn from_pkcs8_der(der: &[u8]) -> Result<Self, VerificationError> {
        if let Ok(key) = p256::ecdsa::SigningKey::from_pkcs8_der(der) {
            return Ok(Self::EcP256(key));
        }
        rsa::RsaPrivateKey::from_pkcs8_der(der)
            .map(Self::Rsa)
            .map_err(|e| VerificationError::Crypto(e.to_string()))
    }

    pub fn sign(&self, signature_uri: &str, data: &[u8]) -> Result<Vec<u8>, VerificationError> {
        match (self, signature_uri) {
            (Self::Rsa(key), _) => {
                let (padding, hashed) = rsa_padding(signature_uri, data)?;
                key.sign(padding, &hashed)
                    .map_err(|e| VerificationError::Crypto(e.to_string()))
            }
            (Self::EcP256(key), algorithm::ECDSA_SHA256) => {
                use signature::Signer;
                let sig: p256::ecdsa::Signature = key.sign(data);
                Ok(sig.to_bytes().to_vec())
            }
            (Self::EcP256(_), other) => {
                Err(VerificationError::UnsupportedAlgorithm(other.to_owned()))
            }
        }
    }
}

/// PKCS#1 v1.5 padding and the pre-hashed message for an RSA signature
/// algorithm URI.
fn rsa_padding(
    signature_uri: &str,
    data: &[u8],
) -> Result<(rsa::Pkcs1v15Sign, Vec<u8>), VerificationError> {
    match signature_uri {
        algorithm::RSA_SHA1 => Ok((
            rsa::Pkcs1v15Sign::new::<Sha1>(),
            Sha1::digest(data).to_vec(),
        )),
        algorithm::RSA_SHA256 => Ok((
            rsa::Pkcs1v15Sign::new::<Sha256>(),
            Sha256::digest(data).to_vec(),
        )),
        algorithm::RSA_SHA384 => Ok((
            rsa::Pkcs1v15Sign::new::<Sha384>(),
            Sha384::digest(data).to_vec(),
        )),
        algorithm::RSA_SHA512 => Ok((
            rsa::Pkcs1v15Sign::new::<Sha512>(),
            Sha512::digest(data).to_vec(),
        )),
        other => Err(VerificationError::UnsupportedAlgorithm(other.to_owned())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use der::Decode;

    #[test]
    fn sha256_known_vector() {
        let out = digest(algorithm::SHA256, b"abc").unwrap();
        assert_eq!(
            hex(&out),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn unknown_digest_uri_rejected() {
        let err = digest("urn:example:md5", b"abc").unwrap_err();
        assert!(matches!(err, VerificationError::UnsupportedAlgorithm(_)));
    }

    #[test]
    fn ecdsa_sign_verify_round_trip() {
        let generated =
            rcgen::generate_simple_self_signed(vec!["test.example.org".to_owned()]).unwrap();
        let key = SigningKey::from_pkcs8_der(&generated.key_pair.serialize_der()).unwrap();
        let cert = x509_cert::Certificate::from_der(generated.cert.der()).unwrap();
        let public = PublicKey::from_certificate(&cert).unwrap();

        let data = b"signed service metadata";
        let sig = key.sign(algorithm::ECDSA_SHA256, data).unwrap();
        assert_eq!(sig.len(), 64);
        public.verify(algorithm::ECDSA_SHA256, data, &sig).unwrap();

        let err = public
            .verify(algorithm::ECDSA_SHA256, b"tampered", &sig)
            .unwrap_err();
        assert!(matches!(err, VerificationError::SignatureInvalid));
    }

    fn hex(bytes: &[u8]) -> String {
        bytes.iter().map(|b| format!("{b:02x}")).collect()
    }
}
