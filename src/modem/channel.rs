//! Sub-band channel masks for the 72-channel US915/AU920 layout.

use core::ops::RangeInclusive;

pub const CHANNEL_COUNT: u8 = 72;

/// Channels a sub-band keeps enabled, every other index gets disabled.
pub struct SubBandPlan {
    pub sub_band: u8,
    pub retained: &'static [RangeInclusive<u8>],
}

pub static SUB_BAND_PLANS: [SubBandPlan; 2] = [
    SubBandPlan {
        sub_band: 1,
        retained: &[0..=7],
    },
    SubBandPlan {
        sub_band: 2,
        retained: &[8..=15, 65..=65],
    },
];

pub fn plan(sub_band: u8) -> Option<&'static SubBandPlan> {
    SUB_BAND_PLANS.iter().find(|plan| plan.sub_band == sub_band)
}

/// Ascending channel indices to disable for `sub_band`; empty when the
/// selector has no plan.
pub fn disabled_channels(sub_band: u8) -> impl Iterator<Item = u8> {
    let retained = plan(sub_band).map(|plan| plan.retained);

    (0..CHANNEL_COUNT).filter(move |channel| match retained {
        Some(ranges) => !ranges.iter().any(|range| range.contains(channel)),
        None => false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sub_band_one_keeps_the_first_eight() {
        let disabled: Vec<u8> = disabled_channels(1).collect();
        assert_eq!(disabled, (8..=71).collect::<Vec<u8>>());
    }

    #[test]
    fn sub_band_two_keeps_second_block_and_channel_65() {
        let disabled: Vec<u8> = disabled_channels(2).collect();
        let expected: Vec<u8> = (0..=7).chain(16..=64).chain(66..=71).collect();
        assert_eq!(disabled, expected);
        assert_eq!(disabled.len(), 8 + 49 + 6);
    }

    #[test]
    fn other_selectors_leave_the_plan_alone() {
        for sub_band in [0, 3, 8, 255] {
            assert_eq!(disabled_channels(sub_band).count(), 0);
        }
    }
}
