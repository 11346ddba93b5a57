use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum FlotillaError {
    #[error("no units in group '{0}'")]
    NoUnitsInGroup(String),

    #[error("unit '{unit}' is not prefixed with its group name '{group}'")]
    BadUnitPrefix { unit: String, group: String },

    #[error("group name '{0}' must not contain '@'")]
    AtInGroupName(String),

    #[error("unit name '{0}' contains more than one '@'")]
    MultipleAtInUnitName(String),

    #[error("unit name '{0}' is used more than once")]
    UnitsSameName(String),

    #[error("group '{0}' mixes scalable and unscalable units")]
    MixedSliceInstance(String),

    #[error("group name '{0}' is used by more than one group")]
    GroupsSameName(String),

    #[error("group name '{0}' is a prefix of group name '{1}'")]
    GroupsArePrefix(String, String),

    #[error("invalid unit status: {0}")]
    InvalidUnitStatus(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("fleet error: {0}")]
    Fleet(String),

    #[error("unit store error: {0}")]
    UnitStore(#[from] std::io::Error),

    #[error("task not found: {0}")]
    TaskNotFound(Uuid),
}

impl FlotillaError {
    pub fn is_no_units_in_group(&self) -> bool {
        matches!(self, FlotillaError::NoUnitsInGroup(_))
    }

    pub fn is_bad_unit_prefix(&self) -> bool {
        matches!(self, FlotillaError::BadUnitPrefix { .. })
    }

    pub fn is_at_in_group_name(&self) -> bool {
        matches!(self, FlotillaError::AtInGroupName(_))
    }

    pub fn is_multiple_at_in_unit_name(&self) -> bool {
        matches!(self, FlotillaError::MultipleAtInUnitName(_))
    }

    pub fn is_units_same_name(&self) -> bool {
        matches!(self, FlotillaError::UnitsSameName(_))
    }

    pub fn is_mixed_slice_instance(&self) -> bool {
        matches!(self, FlotillaError::MixedSliceInstance(_))
    }

    pub fn is_groups_same_name(&self) -> bool {
        matches!(self, FlotillaError::GroupsSameName(_))
    }

    pub fn is_groups_are_prefix(&self) -> bool {
        matches!(self, FlotillaError::GroupsArePrefix(_, _))
    }

    pub fn is_invalid_unit_status(&self) -> bool {
        matches!(self, FlotillaError::InvalidUnitStatus(_))
    }

    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, FlotillaError::InvalidArgument(_))
    }
}

pub type Result<T> = std::result::Result<T, FlotillaError>;
