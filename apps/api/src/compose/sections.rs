//! Section content resolution: enablement flag, caller content, built-in default.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use crate::compose::boilerplate::{self, interpolate};
use crate::compose::error::CompositionError;
use crate::models::quotation::{SectionConfig, SectionContent, SectionKey, SignatureBlock};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SectionBody {
    Items { items: Vec<String> },
    /// `key: value` entries first, then entries without a colon.
    Terms {
        pairs: Vec<(String, String)>,
        plain: Vec<String>,
    },
    Text { text: String },
    Signature(SignatureBlock),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedSection {
    pub key: SectionKey,
    pub body: SectionBody,
}

/// Shape of content each section accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shape {
    Items,
    Terms,
    Text,
    Signature,
}

fn shape_of(key: SectionKey) -> Shape {
    match key {
        SectionKey::Terms => Shape::Terms,
        SectionKey::Closing | SectionKey::ThankYou => Shape::Text,
        SectionKey::Signature => Shape::Signature,
        SectionKey::Note
        | SectionKey::MaterialSpec
        | SectionKey::Warranty
        | SectionKey::SupplierScope
        | SectionKey::CustomerScope
        | SectionKey::ExtraNote
        | SectionKey::FinalNote => Shape::Items,
    }
}

/// Built-in content for a section.
pub fn default_content(key: SectionKey, company: &str) -> Option<SectionBody> {
    let items = |list: &[&str]| SectionBody::Items {
        items: interpolate(list, company),
    };
    let body = match key {
        SectionKey::Note => items(boilerplate::DEFAULT_NOTES),
        SectionKey::Closing => SectionBody::Text {
            text: boilerplate::DEFAULT_CLOSING.to_string(),
        },
        SectionKey::Signature => SectionBody::Signature(SignatureBlock::default()),
        SectionKey::MaterialSpec => items(boilerplate::DEFAULT_MATERIAL_SPEC),
        SectionKey::Warranty => items(boilerplate::DEFAULT_WARRANTY),
        SectionKey::Terms => SectionBody::Terms {
            pairs: boilerplate::DEFAULT_TERMS
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            plain: Vec::new(),
        },
        SectionKey::SupplierScope => items(boilerplate::DEFAULT_SUPPLIER_SCOPE),
        SectionKey::CustomerScope => items(boilerplate::DEFAULT_CUSTOMER_SCOPE),
        SectionKey::ExtraNote => items(boilerplate::DEFAULT_EXTRA_NOTES),
        SectionKey::FinalNote => items(boilerplate::DEFAULT_FINAL_NOTES),
        SectionKey::ThankYou => SectionBody::Text {
            text: boilerplate::THANK_YOU.to_string(),
        },
    };
    Some(body)
}

/// Splits terms entries at the first colon.
///
/// Keys and values are trimmed. A repeated key keeps its first position and
/// takes the later value. Entries without a colon are kept as given; only
/// empty ones are dropped.
pub fn split_terms(entries: &[String]) -> (Vec<(String, String)>, Vec<String>) {
    let mut pairs: Vec<(String, String)> = Vec::new();
    let mut plain = Vec::new();
    for entry in entries {
        match entry.split_once(':') {
            Some((key, value)) => {
                let key = key.trim().to_string();
                let value = value.trim().to_string();
                match pairs.iter_mut().find(|(k, _)| *k == key) {
                    Some(existing) => existing.1 = value,
                    None => pairs.push((key, value)),
                }
            }
            None if !entry.is_empty() => plain.push(entry.clone()),
            None => {}
        }
    }
    (pairs, plain)
}

fn from_caller(key: SectionKey, content: &SectionContent) -> Result<Option<SectionBody>, CompositionError> {
    let mismatch = || CompositionError::SectionResolution { section: key };
    let body = match (shape_of(key), content) {
        (Shape::Items | Shape::Terms, SectionContent::Items { preset, custom })
            if preset.is_empty() && custom.is_empty() =>
        {
            None
        }
        (Shape::Items, SectionContent::Items { preset, custom }) => Some(SectionBody::Items {
            items: preset.iter().chain(custom).cloned().collect(),
        }),
        (Shape::Terms, SectionContent::Items { preset, custom }) => {
            let entries: Vec<String> = preset.iter().chain(custom).cloned().collect();
            let (pairs, plain) = split_terms(&entries);
            Some(SectionBody::Terms { pairs, plain })
        }
        (Shape::Text, SectionContent::Text { text }) if text.trim().is_empty() => None,
        (Shape::Text, SectionContent::Text { text }) => Some(SectionBody::Text { text: text.clone() }),
        (Shape::Signature, SectionContent::Signature(block)) => {
            Some(SectionBody::Signature(block.clone()))
        }
        _ => return Err(mismatch()),
    };
    Ok(body)
}

/// Resolves every enabled section, in fixed document order.
pub fn resolve_sections(
    config: &SectionConfig,
    content: &BTreeMap<SectionKey, SectionContent>,
    company: &str,
) -> Result<Vec<ResolvedSection>, CompositionError> {
    let mut resolved = Vec::new();
    for key in SectionKey::ORDER {
        if !config.is_enabled(key) {
            continue;
        }
        let supplied = match content.get(&key) {
            Some(c) => from_caller(key, c)?,
            None => None,
        };
        let body = match supplied {
            Some(body) => body,
            None => {
                debug!(section = key.as_str(), "using built-in section content");
                default_content(key, company)
                    .ok_or(CompositionError::SectionResolution { section: key })?
            }
        };
        resolved.push(ResolvedSection { key, body });
    }
    Ok(resolved)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn items(preset: &[&str], custom: &[&str]) -> SectionContent {
        SectionContent::Items {
            preset: preset.iter().map(|s| s.to_string()).collect(),
            custom: custom.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_split_terms_pairs_and_plain() {
        let (pairs, plain) =
            split_terms(&["Price: Fixed".to_string(), "No negotiation".to_string()]);
        assert_eq!(pairs, vec![("Price".to_string(), "Fixed".to_string())]);
        assert_eq!(plain, vec!["No negotiation".to_string()]);
    }

    #[test]
    fn test_split_terms_keeps_plain_entries_verbatim() {
        let (_, plain) = split_terms(&[
            "  Site visit on request ".to_string(),
            String::new(),
            "   ".to_string(),
        ]);
        assert_eq!(
            plain,
            vec!["  Site visit on request ".to_string(), "   ".to_string()]
        );
    }

    #[test]
    fn test_split_terms_first_colon_only() {
        let (pairs, _) = split_terms(&["Payment: 40%: advance".to_string()]);
        assert_eq!(pairs[0], ("Payment".to_string(), "40%: advance".to_string()));
    }

    #[test]
    fn test_split_terms_repeated_key_keeps_position() {
        let (pairs, _) = split_terms(&[
            "Price: A".to_string(),
            "Validity: B".to_string(),
            "Price: C".to_string(),
        ]);
        assert_eq!(pairs[0], ("Price".to_string(), "C".to_string()));
        assert_eq!(pairs.len(), 2);
    }

    #[test]
    fn test_disabled_sections_are_skipped() {
        let config = SectionConfig::with(&[SectionKey::ThankYou]);
        let out = resolve_sections(&config, &BTreeMap::new(), "X").unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].key, SectionKey::ThankYou);
    }

    #[test]
    fn test_caller_content_is_preset_then_custom() {
        let config = SectionConfig::with(&[SectionKey::Warranty]);
        let mut content = BTreeMap::new();
        content.insert(SectionKey::Warranty, items(&["a", "b"], &["c"]));
        let out = resolve_sections(&config, &content, "X").unwrap();
        assert_eq!(
            out[0].body,
            SectionBody::Items {
                items: vec!["a".into(), "b".into(), "c".into()]
            }
        );
    }

    #[test]
    fn test_default_used_when_no_content() {
        let config = SectionConfig::with(&[SectionKey::ExtraNote]);
        let out = resolve_sections(&config, &BTreeMap::new(), "GRP TANKS TRADING L.L.C").unwrap();
        match &out[0].body {
            SectionBody::Items { items } => {
                assert_eq!(items.len(), boilerplate::DEFAULT_EXTRA_NOTES.len());
                assert!(items.iter().any(|i| i.contains("GRP TANKS TRADING L.L.C")));
            }
            other => panic!("unexpected body {other:?}"),
        }
    }

    #[test]
    fn test_terms_from_caller_are_split() {
        let config = SectionConfig::with(&[SectionKey::Terms]);
        let mut content = BTreeMap::new();
        content.insert(SectionKey::Terms, items(&["Price: Fixed"], &["No negotiation"]));
        let out = resolve_sections(&config, &content, "X").unwrap();
        assert_eq!(
            out[0].body,
            SectionBody::Terms {
                pairs: vec![("Price".into(), "Fixed".into())],
                plain: vec!["No negotiation".into()],
            }
        );
    }

    #[test]
    fn test_output_follows_fixed_order() {
        let config = SectionConfig::with(&[
            SectionKey::ThankYou,
            SectionKey::Terms,
            SectionKey::Note,
            SectionKey::Closing,
        ]);
        let keys: Vec<SectionKey> = resolve_sections(&config, &BTreeMap::new(), "X")
            .unwrap()
            .into_iter()
            .map(|s| s.key)
            .collect();
        assert_eq!(
            keys,
            vec![
                SectionKey::Note,
                SectionKey::Closing,
                SectionKey::Terms,
                SectionKey::ThankYou
            ]
        );
    }

    #[test]
    fn test_wrong_content_shape_is_contract_error() {
        let config = SectionConfig::with(&[SectionKey::Closing]);
        let mut content = BTreeMap::new();
        content.insert(SectionKey::Closing, SectionContent::Signature(SignatureBlock::default()));
        let err = resolve_sections(&config, &content, "X").unwrap_err();
        assert!(matches!(
            err,
            CompositionError::SectionResolution {
                section: SectionKey::Closing
            }
        ));
    }
}
