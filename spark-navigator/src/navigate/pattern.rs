use crate::navigate::property::zone::{LateralZone, WidthClass, ZoneBoundaries};
use std::fmt::{Display, Formatter};

/// Planner code that asks for a fresh path from the current position.
pub const RESUME_CODE: &str = "A55A21001";

/// Path-blocking codes understood by the route planner.
///
/// The codes are a fixed wire contract (`A55A` marker, `21` command family, length
/// field, then offset tokens). They are looked up, never assembled.
#[derive(Debug, PartialEq, Eq, Hash, Copy, Clone)]
pub enum BlockPattern {
    /// Sent before steering right around a moving obstacle.
    SteerRight,
    /// Sent before steering left around a moving obstacle.
    SteerLeft,
    LeftNarrow,
    LeftWide,
    MidNarrow,
    MidWide,
    RightNarrow,
    RightWide,
}

impl BlockPattern {
    /// The six zone/width entries, in table order.
    pub const CATALOGUE: [BlockPattern; 6] = [
        BlockPattern::LeftNarrow,
        BlockPattern::LeftWide,
        BlockPattern::MidNarrow,
        BlockPattern::MidWide,
        BlockPattern::RightNarrow,
        BlockPattern::RightWide,
    ];

    pub const fn code(&self) -> &'static str {
        match self {
            BlockPattern::SteerRight => "A55A21020N01P02P00P02",
            BlockPattern::SteerLeft => "A55A21020P00P02P01P02",
            BlockPattern::LeftNarrow => "A55A21020N01P02N01P03",
            BlockPattern::LeftWide => "A55A21040N02P02N02P03N01P02N01P03",
            BlockPattern::MidNarrow => "A55A21020P00P02P00P03",
            BlockPattern::MidWide => "A55A21060N01P02N01P03P00P02P00P03P01P02P01P03",
            BlockPattern::RightNarrow => "A55A21020P01P02P01P03",
            BlockPattern::RightWide => "A55A21040P01P02P01P03P02P02P02P03",
        }
    }

    pub fn for_area(zone: LateralZone, width: WidthClass) -> Self {
        match (zone, width) {
            (LateralZone::Left, WidthClass::Narrow) => BlockPattern::LeftNarrow,
            (LateralZone::Left, WidthClass::Wide) => BlockPattern::LeftWide,
            (LateralZone::Mid, WidthClass::Narrow) => BlockPattern::MidNarrow,
            (LateralZone::Mid, WidthClass::Wide) => BlockPattern::MidWide,
            (LateralZone::Right, WidthClass::Narrow) => BlockPattern::RightNarrow,
            (LateralZone::Right, WidthClass::Wide) => BlockPattern::RightWide,
        }
    }
}

impl Display for BlockPattern {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Maps an obstacle's zone and apparent width onto the block catalogue.
#[derive(Copy, Clone, Debug, Default)]
pub struct BlockPatternResolver {
    boundaries: ZoneBoundaries,
}

impl BlockPatternResolver {
    pub fn new(boundaries: ZoneBoundaries) -> Self {
        Self { boundaries }
    }

    pub fn boundaries(&self) -> &ZoneBoundaries {
        &self.boundaries
    }

    pub fn zone(&self, centroid_x: f32) -> LateralZone {
        LateralZone::classify(centroid_x, &self.boundaries)
    }

    pub fn resolve(&self, zone: LateralZone, pixel_width: f32) -> BlockPattern {
        BlockPattern::for_area(zone, WidthClass::classify(pixel_width, &self.boundaries))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn every_area_resolves_to_a_catalogue_entry() {
        let zones = [LateralZone::Left, LateralZone::Mid, LateralZone::Right];
        let widths = [WidthClass::Narrow, WidthClass::Wide];

        let mut seen = HashSet::new();
        for zone in zones {
            for width in widths {
                let pattern = BlockPattern::for_area(zone, width);
                assert!(BlockPattern::CATALOGUE.contains(&pattern));
                seen.insert(pattern.code());
            }
        }
        assert_eq!(seen.len(), 6);
    }

    #[test]
    fn catalogue_codes_are_verbatim() {
        let codes: Vec<_> = BlockPattern::CATALOGUE.iter().map(|p| p.code()).collect();
        assert_eq!(
            codes,
            [
                "A55A21020N01P02N01P03",
                "A55A21040N02P02N02P03N01P02N01P03",
                "A55A21020P00P02P00P03",
                "A55A21060N01P02N01P03P00P02P00P03P01P02P01P03",
                "A55A21020P01P02P01P03",
                "A55A21040P01P02P01P03P02P02P02P03",
            ]
        );
        assert_eq!(BlockPattern::SteerRight.code(), "A55A21020N01P02P00P02");
        assert_eq!(BlockPattern::SteerLeft.code(), "A55A21020P00P02P01P02");
        assert_eq!(RESUME_CODE, "A55A21001");
    }

    #[test]
    fn resolver_uses_width_boundary() {
        let resolver = BlockPatternResolver::default();
        assert_eq!(resolver.resolve(LateralZone::Mid, 300.0), BlockPattern::MidNarrow);
        assert_eq!(resolver.resolve(LateralZone::Mid, 352.0), BlockPattern::MidNarrow);
        assert_eq!(resolver.resolve(LateralZone::Mid, 353.0), BlockPattern::MidWide);
        assert_eq!(resolver.resolve(LateralZone::Left, 400.0), BlockPattern::LeftWide);
        assert_eq!(resolver.resolve(LateralZone::Right, 10.0), BlockPattern::RightNarrow);
    }

    #[test]
    fn every_code_carries_the_frame_marker() {
        for pattern in BlockPattern::CATALOGUE
            .iter()
            .chain([BlockPattern::SteerLeft, BlockPattern::SteerRight].iter())
        {
            assert!(pattern.code().starts_with("A55A21"));
        }
    }
}
