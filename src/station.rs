use std::fmt;

/// Unique key addressing one station in the index.
pub type StationId = i64;

/// The mutable operational attributes of a charging station.
///
/// A record has no identity of its own: it is always addressed through the
/// [`StationId`] it is stored under.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StationRecord {
    pub power_kw: i32,
    pub price_cents: i32,
    pub slots_free: i32,
    pub last_update: i64,
}

impl StationRecord {
    pub const fn new(power_kw: i32, price_cents: i32, slots_free: i32, last_update: i64) -> Self {
        Self {
            power_kw,
            price_cents,
            slots_free,
            last_update,
        }
    }

    #[inline]
    pub fn get(&self, attribute: Attribute) -> i64 {
        match attribute {
            Attribute::Power => i64::from(self.power_kw),
            Attribute::Price => i64::from(self.price_cents),
            Attribute::Slots => i64::from(self.slots_free),
        }
    }
}

/// A station attribute that rules can refer to by name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Attribute {
    Power,
    Price,
    Slots,
}

impl Attribute {
    pub fn by_name(name: &str) -> Option<Self> {
        match name {
            "power" => Some(Self::Power),
            "price" => Some(Self::Price),
            "slots" => Some(Self::Slots),
            _ => None,
        }
    }

    pub const fn name(&self) -> &'static str {
        match self {
            Self::Power => "power",
            Self::Price => "price",
            Self::Slots => "slots",
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn can_read_every_attribute_of_a_record() {
        let record = StationRecord::new(150, 320, 4, 12);

        assert_eq!(record.get(Attribute::Power), 150);
        assert_eq!(record.get(Attribute::Price), 320);
        assert_eq!(record.get(Attribute::Slots), 4);
    }

    #[test]
    fn can_resolve_attributes_by_name() {
        for attribute in [Attribute::Power, Attribute::Price, Attribute::Slots] {
            assert_eq!(Attribute::by_name(attribute.name()), Some(attribute));
        }
    }

    #[test]
    fn return_none_for_an_unknown_attribute_name() {
        assert_eq!(Attribute::by_name("voltage"), None);
        assert_eq!(Attribute::by_name("Power"), None);
    }
}
