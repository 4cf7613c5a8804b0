use std::fmt;

/// Bitmask over the mobility assistance capabilities a booking may require.
///
/// Parsed from the free-text tag list on a booking. Unknown tags count as
/// ambulatory, and a booking without any tags is ambulatory as well, so the
/// mask of a constructed trip is never empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MobilityAssistance(u8);

impl MobilityAssistance {
    pub const AMBULATORY: Self = Self(1);
    pub const WHEELCHAIR: Self = Self(2);
    pub const STRETCHER: Self = Self(16);

    pub fn from_tags<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut mask = Self(0);
        for tag in tags {
            mask = mask.union(Self::from_tag(tag.as_ref()));
        }
        if mask.0 == 0 {
            Self::AMBULATORY
        } else {
            mask
        }
    }

    fn from_tag(tag: &str) -> Self {
        match tag.trim().to_lowercase().as_str() {
            "wheelchair" | "wc" => Self::WHEELCHAIR,
            "stretcher" | "gurney" | "gur" => Self::STRETCHER,
            _ => Self::AMBULATORY,
        }
    }

    pub fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    /// Scheduling pass this mask belongs to. Stretcher trips are placed
    /// first, wheelchair trips second, everything else last.
    pub fn priority_bucket(self) -> usize {
        if self.contains(Self::STRETCHER) {
            0
        } else if self.contains(Self::WHEELCHAIR) {
            1
        } else {
            2
        }
    }

    /// Capability code fragment used to compose synthetic shuttle names.
    pub fn capability_code(self) -> String {
        let mut code = String::new();
        if self.contains(Self::STRETCHER) {
            code.push_str("GUR");
        }
        if self.contains(Self::WHEELCHAIR) {
            code.push_str("WC");
        }
        if self.contains(Self::AMBULATORY) {
            code.push_str("AMBI");
        }
        code
    }

    pub fn bits(self) -> u8 {
        self.0
    }
}

impl fmt::Display for MobilityAssistance {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.capability_code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_tag_list_defaults_to_ambulatory() {
        let mask = MobilityAssistance::from_tags(Vec::<String>::new());
        assert_eq!(mask, MobilityAssistance::AMBULATORY);
        assert!(mask.bits() > 0);
    }

    #[test]
    fn unknown_tags_count_as_ambulatory() {
        let mask = MobilityAssistance::from_tags(["cane", "service animal"]);
        assert_eq!(mask, MobilityAssistance::AMBULATORY);
    }

    #[test]
    fn tags_parse_case_insensitively_and_or_together() {
        let mask = MobilityAssistance::from_tags(["Wheelchair", "STRETCHER"]);
        assert!(mask.contains(MobilityAssistance::WHEELCHAIR));
        assert!(mask.contains(MobilityAssistance::STRETCHER));
        assert!(!mask.contains(MobilityAssistance::AMBULATORY));
        assert_eq!(mask.bits(), 18);
    }

    #[test]
    fn bucket_order_is_stretcher_wheelchair_rest() {
        assert_eq!(MobilityAssistance::from_tags(["gurney"]).priority_bucket(), 0);
        assert_eq!(
            MobilityAssistance::from_tags(["wheelchair", "stretcher"]).priority_bucket(),
            0
        );
        assert_eq!(MobilityAssistance::from_tags(["wheelchair"]).priority_bucket(), 1);
        assert_eq!(MobilityAssistance::from_tags(["walker"]).priority_bucket(), 2);
    }

    #[test]
    fn capability_codes_concatenate_in_fixed_order() {
        assert_eq!(MobilityAssistance::AMBULATORY.capability_code(), "AMBI");
        assert_eq!(MobilityAssistance::WHEELCHAIR.capability_code(), "WC");
        let all = MobilityAssistance::from_tags(["stretcher", "wheelchair", "x"]);
        assert_eq!(all.capability_code(), "GURWCAMBI");
    }
}
