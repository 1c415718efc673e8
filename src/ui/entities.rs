//! Decoding of the HTML entities the question provider embeds in its strings.

/// Replace named, decimal and hex character references. Unknown or malformed
/// entities are left as-is.
pub fn decode(input: &str) -> String {
    html_escape::decode_html_entities(input).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_common_provider_entities() {
        assert_eq!(
            decode("Who wrote &quot;Hamlet&quot;? It&#039;s &amp; easy"),
            "Who wrote \"Hamlet\"? It's & easy"
        );
    }

    #[test]
    fn decodes_hex_and_accented() {
        assert_eq!(decode("Caf&eacute; &#x2603;"), "Café ☃");
    }

    #[test]
    fn test_decodes_accented_capitals_latin1_and_greek() {
        assert_eq!(decode("&Aacute;frica"), "África");
        assert_eq!(decode("S&atilde;o Paulo"), "São Paulo");
        assert_eq!(decode("na&iuml;ve"), "naïve");
        assert_eq!(decode("&alpha; particle"), "α particle");
        assert_eq!(decode("Cr&egrave;me br&ucirc;l&eacute;e"), "Crème brûlée");
        assert_eq!(decode("&Omega; &Ntilde;&ouml;"), "Ω Ñö");
    }

    #[test]
    fn leaves_unknown_and_bare_ampersands() {
        assert_eq!(decode("A & B"), "A & B");
        assert_eq!(decode("&bogus; stays"), "&bogus; stays");
    }

    #[test]
    fn handles_adjacent_entities() {
        assert_eq!(decode("&lt;&gt;&amp;&amp;"), "<>&&");
    }
}
