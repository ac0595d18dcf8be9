/// Energy moved out of the battery during a discharge phase.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DischargeOutcome {
    /// Energy delivered to the household after discharge losses (kWh).
    pub delivered_kwh: f64,
    /// Stored energy consumed to deliver it (kWh).
    pub withdrawn_kwh: f64,
}

/// Energy moved into the battery during a charge phase.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChargeOutcome {
    /// Energy that ended up stored after charge losses (kWh).
    pub stored_kwh: f64,
    /// Surplus energy consumed to store it (kWh).
    pub consumed_kwh: f64,
}

/// A home battery that absorbs grid feed-in and covers grid draw.
///
/// `BatteryStorage` tracks the stored energy in kWh and applies a loss
/// fraction on each direction of transfer. Losses are expressed relative to
/// the larger side of the transfer: charging `x` kWh of surplus stores
/// `x * (1 - charge_loss)`, and delivering `y` kWh withdraws
/// `y / (1 - discharge_loss)` from storage.
///
/// A loss fraction of exactly 1.0 blocks that direction entirely instead of
/// dividing by zero.
#[derive(Debug, Clone)]
pub struct BatteryStorage {
    /// Usable capacity in kilowatt-hours.
    capacity_kwh: f64,

    /// Stored energy in kilowatt-hours (0.0 to `capacity_kwh`).
    charge_kwh: f64,

    /// Fraction of surplus lost while charging (0.0..=1.0).
    charge_loss: f64,

    /// Fraction of stored energy lost while discharging (0.0..=1.0).
    discharge_loss: f64,
}

impl BatteryStorage {
    /// Creates an empty battery.
    ///
    /// # Arguments
    ///
    /// * `capacity_kwh` - Usable capacity in kWh (0 disables the battery)
    /// * `charge_loss` - Charging loss fraction (0.0..=1.0)
    /// * `discharge_loss` - Discharging loss fraction (0.0..=1.0)
    ///
    /// # Panics
    ///
    /// Panics if capacity is negative or a loss fraction is outside [0, 1].
    /// Callers validate user input before constructing the battery.
    pub fn new(capacity_kwh: f64, charge_loss: f64, discharge_loss: f64) -> Self {
        assert!(capacity_kwh >= 0.0);
        assert!((0.0..=1.0).contains(&charge_loss));
        assert!((0.0..=1.0).contains(&discharge_loss));

        Self {
            capacity_kwh,
            charge_kwh: 0.0,
            charge_loss,
            discharge_loss,
        }
    }

    pub fn capacity_kwh(&self) -> f64 {
        self.capacity_kwh
    }

    pub fn charge_kwh(&self) -> f64 {
        self.charge_kwh
    }

    /// Remaining room before the battery is full (kWh).
    pub fn headroom_kwh(&self) -> f64 {
        (self.capacity_kwh - self.charge_kwh).max(0.0)
    }

    /// Energy the battery could deliver right now, after discharge losses (kWh).
    pub fn usable_kwh(&self) -> f64 {
        self.charge_kwh * (1.0 - self.discharge_loss)
    }

    /// Covers as much of `demand_kwh` as the stored energy allows.
    pub fn discharge(&mut self, demand_kwh: f64) -> DischargeOutcome {
        let efficiency = 1.0 - self.discharge_loss;
        let usable_kwh = self.usable_kwh();

        if efficiency <= 0.0 || usable_kwh <= 0.0 || demand_kwh <= 0.0 {
            return DischargeOutcome {
                delivered_kwh: 0.0,
                withdrawn_kwh: 0.0,
            };
        }

        let delivered_kwh = usable_kwh.min(demand_kwh);
        let withdrawn_kwh = delivered_kwh / efficiency;
        self.charge_kwh -= withdrawn_kwh;

        DischargeOutcome {
            delivered_kwh,
            withdrawn_kwh,
        }
    }

    /// Stores as much of `surplus_kwh` as the remaining headroom allows.
    pub fn charge(&mut self, surplus_kwh: f64) -> ChargeOutcome {
        let efficiency = 1.0 - self.charge_loss;
        let headroom_kwh = self.capacity_kwh - self.charge_kwh;

        if efficiency <= 0.0 || headroom_kwh <= 0.0 || surplus_kwh <= 0.0 {
            return ChargeOutcome {
                stored_kwh: 0.0,
                consumed_kwh: 0.0,
            };
        }

        let stored_kwh = headroom_kwh.min(surplus_kwh * efficiency);
        let consumed_kwh = stored_kwh / efficiency;
        self.charge_kwh += stored_kwh;

        ChargeOutcome {
            stored_kwh,
            consumed_kwh,
        }
    }

    /// Pulls the stored energy back into `[0, capacity]` after float drift.
    pub fn clamp(&mut self) {
        self.charge_kwh = self.charge_kwh.clamp(0.0, self.capacity_kwh);
    }
}
