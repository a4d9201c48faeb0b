//! Channel selection from the `channel` configuration string.

use crate::error::{IngestionError, Result};

/// Selected channels in configuration order.
///
/// Duplicates and order are kept exactly as written. Channel numbers are
/// 1-based; channel `c` reads raw channel index `c - 1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelSelection {
    channels: Vec<i32>,
}

impl ChannelSelection {
    /// Parse a comma-separated list such as `"1,3,5"`.
    ///
    /// Whitespace around tokens is ignored. An empty string, an empty token,
    /// or a token that is not an integer is a configuration error.
    pub fn parse(spec: &str) -> Result<Self> {
        if spec.trim().is_empty() {
            return Err(IngestionError::ConfigParse(
                "channel list is empty".to_string(),
            ));
        }

        let channels = spec
            .split(',')
            .map(|token| {
                let token = token.trim();
                token.parse::<i32>().map_err(|e| {
                    IngestionError::ConfigParse(format!("invalid channel '{}': {}", token, e))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { channels })
    }

    /// 1-based channel numbers.
    pub fn channels(&self) -> &[i32] {
        &self.channels
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Zero-based raw channel indices, in selection order.
    ///
    /// Fails if a channel falls outside `1..=n_channels_raw`.
    pub fn raw_indices(&self, n_channels_raw: usize) -> Result<Vec<usize>> {
        self.channels
            .iter()
            .map(|&c| {
                usize::try_from(c)
                    .ok()
                    .and_then(|c| c.checked_sub(1))
                    .filter(|&idx| idx < n_channels_raw)
                    .ok_or_else(|| {
                        IngestionError::ConfigParse(format!(
                            "channel {} outside 1..={}",
                            c, n_channels_raw
                        ))
                    })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_list() {
        let sel = ChannelSelection::parse("1,3,5").unwrap();
        assert_eq!(sel.channels(), &[1, 3, 5]);
        assert_eq!(sel.len(), 3);
        assert_eq!(sel.raw_indices(22).unwrap(), vec![0, 2, 4]);
    }

    #[test]
    fn test_parse_keeps_order_and_duplicates() {
        let sel = ChannelSelection::parse("7, 2,7 ,1").unwrap();
        assert_eq!(sel.channels(), &[7, 2, 7, 1]);
        assert_eq!(sel.raw_indices(8).unwrap(), vec![6, 1, 6, 0]);
    }

    #[test]
    fn test_parse_single_channel() {
        let sel = ChannelSelection::parse("12").unwrap();
        assert_eq!(sel.channels(), &[12]);
    }

    #[test]
    fn test_parse_rejects_empty() {
        assert!(matches!(
            ChannelSelection::parse(""),
            Err(IngestionError::ConfigParse(_))
        ));
        assert!(matches!(
            ChannelSelection::parse("   "),
            Err(IngestionError::ConfigParse(_))
        ));
    }

    #[test]
    fn test_parse_rejects_bad_tokens() {
        for spec in ["1,x,3", "1,,3", "1,3,", "1.5", "one"] {
            assert!(
                ChannelSelection::parse(spec).is_err(),
                "'{}' should not parse",
                spec
            );
        }
    }

    #[test]
    fn test_raw_indices_bounds() {
        let sel = ChannelSelection::parse("0").unwrap();
        assert!(sel.raw_indices(4).is_err());

        let sel = ChannelSelection::parse("5").unwrap();
        assert!(sel.raw_indices(4).is_err());
        assert_eq!(sel.raw_indices(5).unwrap(), vec![4]);

        let sel = ChannelSelection::parse("-2").unwrap();
        assert!(sel.raw_indices(4).is_err());
    }
}
