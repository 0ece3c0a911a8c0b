//! Reservation context passed explicitly into every manager.

use serde::{Deserialize, Serialize};

use crate::family::DeviceFamily;

/// Identity of the device being configured and the reservation driving it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationContext {
    /// Name of the switch resource in the topology.
    pub resource_name: String,
    /// Resource model, used to select the device family.
    pub resource_model: String,
    /// Reservation the configuration belongs to.
    pub reservation_id: String,
}

impl ReservationContext {
    /// Creates a new context.
    pub fn new(
        resource_name: impl Into<String>,
        resource_model: impl Into<String>,
        reservation_id: impl Into<String>,
    ) -> Self {
        Self {
            resource_name: resource_name.into(),
            resource_model: resource_model.into(),
            reservation_id: reservation_id.into(),
        }
    }

    /// Returns the device family for this resource.
    pub fn family(&self) -> DeviceFamily {
        DeviceFamily::from_model(&self.resource_model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::family::NXOS_MODEL;

    #[test]
    fn test_family_from_context() {
        let ctx = ReservationContext::new("leaf1", NXOS_MODEL, "res-42");
        assert_eq!(ctx.family(), DeviceFamily::Nxos);

        let ctx = ReservationContext::new("access1", "Cisco IOS Switch", "res-42");
        assert_eq!(ctx.family(), DeviceFamily::Ios);
    }
}
