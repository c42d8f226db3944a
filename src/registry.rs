use crate::accept::Capabilities;
use crate::codec::Codec;

/// Codecs offered by the server, most preferred first.
///
/// The order is the only tie-break between codecs a client accepts, and its
/// first entry is what a `*` wildcard resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registry {
    codecs: Vec<Codec>,
}

impl Registry {
    /// Creates a registry from codecs in preference order.
    ///
    /// Repeated codecs keep their first position.
    pub fn new<I>(codecs: I) -> Self
    where
        I: IntoIterator<Item = Codec>,
    {
        let mut ordered = Vec::new();
        for codec in codecs {
            if !ordered.contains(&codec) {
                ordered.push(codec);
            }
        }
        Self { codecs: ordered }
    }

    /// Returns the codecs in preference order.
    pub fn codecs(&self) -> &[Codec] {
        &self.codecs
    }

    /// Picks the codec to use for a client with the given capabilities.
    ///
    /// A wildcard maps to the most preferred codec even when the client also
    /// excluded that codec explicitly. Stricter negotiation per RFC 9110
    /// section 12.5.3 would honour the exclusion.
    pub fn select(&self, capabilities: &Capabilities<'_>) -> Option<Codec> {
        if capabilities.has_wildcard() {
            return self.codecs.first().copied();
        }

        self.codecs
            .iter()
            .copied()
            .find(|codec| capabilities.contains(codec.content_encoding()))
    }
}

impl Default for Registry {
    /// Zstd, then Brotli, then Gzip.
    fn default() -> Self {
        Self::new([
            #[cfg(feature = "zstd")]
            Codec::Zstd,
            #[cfg(feature = "brotli")]
            Codec::Brotli,
            #[cfg(feature = "gzip")]
            Codec::Gzip,
        ])
    }
}
