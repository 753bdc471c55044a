use num_enum::TryFromPrimitive;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    Horizontal,
    Vertical,
}

impl Axis {
    pub fn cross(self) -> Axis {
        match self {
            Axis::Horizontal => Axis::Vertical,
            Axis::Vertical => Axis::Horizontal,
        }
    }
}

/// A positioning preference. Control tokens steer the search; every other
/// option places the window along exactly one axis.
///
/// "Forward" and "backward" follow the text direction: forward is right in
/// left-to-right text and left in right-to-left text.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    EnumIter,
    TryFromPrimitive,
    Serialize,
    Deserialize
)]
#[repr(u8)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AttachmentOption {
    /// Terminates an option sequence. Also reported when the chosen option
    /// cannot be identified.
    #[default]
    EndOptions = 0,
    ForceFirstOption,
    /// Secondary lists only: like `ForceFirstOption`, but only while the
    /// primary option is being forced.
    ForceFirstOptionIfPrimaryForced,
    ForceLastOption,
    /// Secondary lists only.
    ForceLastOptionIfPrimaryForced,
    /// Window's bottom edge against the rectangle's top edge.
    AttachTopEdge,
    /// Window's right edge against the rectangle's left edge.
    AttachLeftEdge,
    AttachRightEdge,
    AttachBottomEdge,
    AttachForwardEdge,
    AttachBackwardEdge,
    AlignTopEdges,
    AlignLeftEdges,
    AlignRightEdges,
    AlignBottomEdges,
    AlignForwardEdges,
    AlignBackwardEdges,
    CenterHorizontally,
    CenterVertically,
    CenterOnTopEdge,
    CenterOnLeftEdge,
    CenterOnRightEdge,
    CenterOnBottomEdge,
    CenterOnForwardEdge,
    CenterOnBackwardEdge,
    AttachAboveCenter,
    AttachBelowCenter,
    AttachLeftOfCenter,
    AttachRightOfCenter,
    AttachForwardOfCenter,
    AttachBackwardOfCenter,
}

impl AttachmentOption {
    pub fn is_control(self) -> bool {
        use AttachmentOption::*;
        matches!(
            self,
            EndOptions
                | ForceFirstOption
                | ForceFirstOptionIfPrimaryForced
                | ForceLastOption
                | ForceLastOptionIfPrimaryForced
        )
    }

    pub fn is_force_first(self) -> bool {
        matches!(
            self,
            AttachmentOption::ForceFirstOption | AttachmentOption::ForceFirstOptionIfPrimaryForced
        )
    }

    pub fn is_force_last(self) -> bool {
        matches!(
            self,
            AttachmentOption::ForceLastOption | AttachmentOption::ForceLastOptionIfPrimaryForced
        )
    }

    pub fn is_if_primary_forced(self) -> bool {
        matches!(
            self,
            AttachmentOption::ForceFirstOptionIfPrimaryForced
                | AttachmentOption::ForceLastOptionIfPrimaryForced
        )
    }

    /// The axis the option positions along, or `None` for control tokens.
    /// Independent of text direction.
    pub fn axis(self) -> Option<Axis> {
        use AttachmentOption::*;
        match self {
            AttachLeftEdge | AttachRightEdge | AttachForwardEdge | AttachBackwardEdge
            | AlignLeftEdges | AlignRightEdges | AlignForwardEdges | AlignBackwardEdges
            | CenterHorizontally | CenterOnLeftEdge | CenterOnRightEdge | CenterOnForwardEdge
            | CenterOnBackwardEdge | AttachLeftOfCenter | AttachRightOfCenter
            | AttachForwardOfCenter | AttachBackwardOfCenter => Some(Axis::Horizontal),
            AttachTopEdge | AttachBottomEdge | AlignTopEdges | AlignBottomEdges
            | CenterVertically | CenterOnTopEdge | CenterOnBottomEdge | AttachAboveCenter
            | AttachBelowCenter => Some(Axis::Vertical),
            EndOptions
            | ForceFirstOption
            | ForceFirstOptionIfPrimaryForced
            | ForceLastOption
            | ForceLastOptionIfPrimaryForced => None,
        }
    }

    /// Resolves forward/backward options to left/right for the given text
    /// direction. All other options map to themselves.
    pub fn base_option(self, right_to_left: bool) -> AttachmentOption {
        use AttachmentOption::*;
        let pick = |ltr: AttachmentOption, rtl: AttachmentOption| if right_to_left { rtl } else { ltr };
        match self {
            AttachForwardEdge => pick(AttachRightEdge, AttachLeftEdge),
            AttachBackwardEdge => pick(AttachLeftEdge, AttachRightEdge),
            AlignForwardEdges => pick(AlignRightEdges, AlignLeftEdges),
            AlignBackwardEdges => pick(AlignLeftEdges, AlignRightEdges),
            CenterOnForwardEdge => pick(CenterOnRightEdge, CenterOnLeftEdge),
            CenterOnBackwardEdge => pick(CenterOnLeftEdge, CenterOnRightEdge),
            AttachForwardOfCenter => pick(AttachRightOfCenter, AttachLeftOfCenter),
            AttachBackwardOfCenter => pick(AttachLeftOfCenter, AttachRightOfCenter),
            _ => self,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use strum::IntoEnumIterator;
    use test_log::test;

    use super::*;

    #[test]
    fn it_swaps_forward_and_backward_in_rtl() {
        for option in AttachmentOption::iter() {
            let paired = match option {
                AttachmentOption::AttachForwardEdge => AttachmentOption::AttachBackwardEdge,
                AttachmentOption::AlignForwardEdges => AttachmentOption::AlignBackwardEdges,
                AttachmentOption::CenterOnForwardEdge => AttachmentOption::CenterOnBackwardEdge,
                AttachmentOption::AttachForwardOfCenter => AttachmentOption::AttachBackwardOfCenter,
                _ => continue,
            };
            assert_eq!(option.base_option(true), paired.base_option(false));
            assert_eq!(paired.base_option(true), option.base_option(false));
        }
        assert_eq!(
            AttachmentOption::AttachForwardEdge.base_option(false),
            AttachmentOption::AttachRightEdge
        );
        assert_eq!(
            AttachmentOption::AttachForwardEdge.base_option(true),
            AttachmentOption::AttachLeftEdge
        );
    }

    #[test]
    fn it_keeps_axes_independent_of_text_direction() {
        for option in AttachmentOption::iter() {
            assert_eq!(option.axis().is_none(), option.is_control(), "{option}");
            assert_eq!(option.base_option(true).axis(), option.axis(), "{option}");
            assert_eq!(option.base_option(false).axis(), option.axis(), "{option}");
        }
        assert_eq!(AttachmentOption::CenterHorizontally.axis(), Some(Axis::Horizontal));
        assert_eq!(AttachmentOption::AttachBelowCenter.axis(), Some(Axis::Vertical));
        assert_eq!(Axis::Horizontal.cross(), Axis::Vertical);
    }

    #[test]
    fn it_parses_snake_case_names() {
        assert_eq!(
            "attach_bottom_edge".parse::<AttachmentOption>().unwrap(),
            AttachmentOption::AttachBottomEdge
        );
        assert_eq!(AttachmentOption::ForceLastOption.to_string(), "force_last_option");
        assert_eq!(AttachmentOption::try_from(5u8).unwrap(), AttachmentOption::AttachTopEdge);
    }
}
