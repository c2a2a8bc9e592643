//! Golden fingerprint vectors for deterministic verification.
//!
//! These vectors pin the canonical encoding: every implementation must
//! derive identical preimages and digests from the same inputs. Inputs
//! are literals; outputs are computed, so the vectors double as a
//! regression net for the encoder.

use serde::{Deserialize, Serialize};

use vellum_core::fingerprint::{DOCUMENT_DOMAIN, SIGNATURE_DOMAIN};
use vellum_core::{canonical, Content, DocumentId, FieldValue, Fingerprint, UserId};

/// A golden creation-fingerprint vector.
#[derive(Debug, Clone)]
pub struct GoldenVector {
    /// Human-readable name for the vector.
    pub name: &'static str,
    /// Document title.
    pub title: &'static str,
    /// Text content fields as (name, value) pairs.
    pub fields: &'static [(&'static str, &'static str)],
    /// Creation timestamp (Unix ms).
    pub created_at: i64,
}

/// A golden signature-digest vector.
#[derive(Debug, Clone)]
pub struct SignatureVector {
    pub name: &'static str,
    pub document: [u8; 16],
    pub signer: [u8; 16],
    pub signed_at: i64,
}

/// Get all creation vectors.
pub fn all_vectors() -> Vec<GoldenVector> {
    vec![
        GoldenVector {
            name: "empty content",
            title: "Untitled",
            fields: &[],
            created_at: 0,
        },
        GoldenVector {
            name: "single field NDA",
            title: "Mutual NDA",
            fields: &[("counterparty", "Hollis & Gray LLP")],
            created_at: 1_736_870_400_000, // 2025-01-14T16:00:00Z
        },
        GoldenVector {
            name: "multi field engagement letter",
            title: "Engagement Letter",
            fields: &[
                ("client", "Meridian Partners LLC"),
                ("matter", "Series B financing"),
                ("scope", "Diligence and closing"),
            ],
            created_at: 1_736_870_401_000,
        },
        GoldenVector {
            name: "unicode fields",
            title: "秘密保持契約",
            fields: &[("partei", "Müller & Söhne GmbH"), ("city", "São Paulo")],
            created_at: 1_736_870_402_000,
        },
        GoldenVector {
            name: "pre-epoch instant",
            title: "Backdated Memo",
            fields: &[],
            created_at: -1,
        },
    ]
}

/// Get all signature vectors.
pub fn signature_vectors() -> Vec<SignatureVector> {
    vec![
        SignatureVector {
            name: "zero ids",
            document: [0x00; 16],
            signer: [0x00; 16],
            signed_at: 0,
        },
        SignatureVector {
            name: "fixed ids",
            document: [0x11; 16],
            signer: [0x22; 16],
            signed_at: 1_736_870_400_000,
        },
        SignatureVector {
            name: "swapped ids",
            document: [0x22; 16],
            signer: [0x11; 16],
            signed_at: 1_736_870_400_000,
        },
    ]
}

/// Build the content map for a vector.
pub fn content_from_vector(vector: &GoldenVector) -> Content {
    vector
        .fields
        .iter()
        .map(|(name, value)| ((*name).to_string(), FieldValue::Text((*value).to_string())))
        .collect()
}

/// Compute the creation fingerprint for a vector.
pub fn fingerprint_from_vector(vector: &GoldenVector) -> Fingerprint {
    let content = content_from_vector(vector);
    let preimage = canonical::creation_preimage(vector.title, &content, vector.created_at);
    Fingerprint::digest(DOCUMENT_DOMAIN, &preimage)
}

/// Compute the signature digest for a vector.
pub fn signature_from_vector(vector: &SignatureVector) -> Fingerprint {
    let preimage = canonical::signature_preimage(
        &DocumentId::from_bytes(vector.document),
        &UserId::from_bytes(vector.signer),
        vector.signed_at,
    );
    Fingerprint::digest(SIGNATURE_DOMAIN, &preimage)
}

/// One computed vector in exportable form.
#[derive(Debug, Serialize, Deserialize)]
pub struct VectorReport {
    pub name: String,
    /// Creation preimage, hex.
    pub preimage: String,
    /// Creation fingerprint, hex.
    pub fingerprint: String,
}

/// Compute every creation vector, hex-encoded for export.
pub fn report_all() -> Vec<VectorReport> {
    all_vectors()
        .iter()
        .map(|vector| {
            let content = content_from_vector(vector);
            let preimage =
                canonical::creation_preimage(vector.title, &content, vector.created_at);
            VectorReport {
                name: vector.name.to_string(),
                preimage: hex::encode(&preimage),
                fingerprint: Fingerprint::digest(DOCUMENT_DOMAIN, &preimage).to_hex(),
            }
        })
        .collect()
}

/// The full creation vector set as pretty JSON, for handing to another
/// implementation.
pub fn vectors_json() -> String {
    serde_json::to_string_pretty(&report_all()).expect("vector report serializes")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vectors_are_deterministic() {
        for vector in all_vectors() {
            let a = fingerprint_from_vector(&vector);
            let b = fingerprint_from_vector(&vector);
            assert_eq!(a, b, "fingerprint drifted for {}", vector.name);
        }
        for vector in signature_vectors() {
            let a = signature_from_vector(&vector);
            let b = signature_from_vector(&vector);
            assert_eq!(a, b, "signature drifted for {}", vector.name);
        }
    }

    #[test]
    fn test_vectors_are_distinct() {
        let fingerprints: Vec<Fingerprint> =
            all_vectors().iter().map(fingerprint_from_vector).collect();
        for (i, a) in fingerprints.iter().enumerate() {
            for b in &fingerprints[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_export_roundtrips_through_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vectors.json");
        std::fs::write(&path, vectors_json()).unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        let parsed: Vec<VectorReport> = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed.len(), all_vectors().len());

        // Parsed fingerprints still verify against recomputation.
        for (report, vector) in parsed.iter().zip(all_vectors()) {
            assert_eq!(report.fingerprint, fingerprint_from_vector(&vector).to_hex());
        }
    }
}
