//! Status code tables for the Schneider EVlink Pro AC.
//!
//! Codes and labels follow the device handbook. Tables are static and
//! immutable; concurrent read access needs no synchronization.

/// A static mapping from a 16-bit status code to a descriptive label.
pub struct LookupTable {
    name: &'static str,
    entries: &'static [(u16, &'static str)],
}

impl LookupTable {
    pub const fn new(name: &'static str, entries: &'static [(u16, &'static str)]) -> Self {
        Self { name, entries }
    }

    /// Table name, for logging.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Look up the label for a code, if the table defines one.
    pub fn label(&self, code: u16) -> Option<&'static str> {
        self.entries
            .iter()
            .find(|(c, _)| *c == code)
            .map(|(_, label)| *label)
    }

    /// Resolve a code to its label, falling back to `Unbekannt (<code>)`
    /// for codes not in the table. The raw code stays visible either way.
    pub fn resolve(&self, code: u16) -> String {
        match self.label(code) {
            Some(label) => label.to_string(),
            None => format!("Unbekannt ({code})"),
        }
    }
}

/// Fault codes, handbook table plus the EVCC-observed values.
pub static FAULT_MAP: LookupTable = LookupTable::new(
    "fault",
    &[
        (0, "Kein Fehler"),
        (1, "Interner Fehler"),
        (2, "Fehler Erdung"),
        (3, "Fehler Überspannung"),
        (4, "Fehler Unterspannung"),
        (5, "Fehler Überstrom"),
        (6, "Fehler Temperatur"),
        (7, "Fehler Kommunikation"),
        (8, "Fehler FI"),
        (9, "Fehler Relais"),
        (10, "Fehler Lüfter"),
        (11, "Fehler Verriegelung"),
        (12, "Fehler Authentifizierung"),
        (13, "Fehler RFID"),
        (14, "Fehler Zähler"),
        (15, "Fehler OCPP"),
        (65535, "Ungültig/Fehler"),
    ],
);

/// Reasons the last charging session stopped, handbook table 34.
pub static LAST_STOP_CAUSE_MAP: LookupTable = LookupTable::new(
    "last_stop_cause",
    &[
        (0, "Nicht gestoppt / Unbekannt"),
        (1, "Vom Benutzer gestoppt"),
        (2, "Vom Fahrzeug gestoppt"),
        (3, "Fehler"),
        (4, "Energie-Limit erreicht"),
        (5, "Zeit-Limit erreicht"),
        (6, "Extern gestoppt"),
        (7, "Not-Aus"),
        (8, "Kommunikationsfehler"),
        (9, "Lastmanagement"),
        (65535, "Ungültig/Fehler"),
    ],
);

/// OCPP charge-point status.
pub static OCPP_STATUS_MAP: LookupTable = LookupTable::new(
    "ocpp_status",
    &[
        (0, "Unbekannt"),
        (1, "Verfügbar"),
        (2, "Vorbereitet"),
        (3, "Besetzt"),
        (4, "Fehler"),
        (5, "Fahrzeug verbunden"),
        (6, "Fahrzeug verbunden"),
        (7, "Wartung"),
        (8, "Abgeschlossen"),
        (9, "Authentifizierung läuft"),
        (10, "Authentifizierung fehlgeschlagen"),
        (11, "Remote gestoppt"),
        (12, "Remote gestartet"),
        (65535, "Ungültig/Fehler"),
    ],
);

/// IEC 61851 vehicle connection state, collapsed to connection phases.
pub static EV_STATE_MAP: LookupTable = LookupTable::new(
    "ev_state",
    &[
        (0, "Kein Fahrzeug verbunden"),
        (1, "Kein Fahrzeug verbunden"),
        (2, "Fahrzeug verbunden"),
        (3, "Fahrzeug verbunden"),
        (4, "Fahrzeug verbunden"),
        (5, "Fahrzeug verbunden"),
        (6, "Fahrzeug lädt"),
        (7, "Fahrzeug lädt"),
        (8, "Fahrzeug lädt"),
        (9, "Fahrzeug lädt"),
        (10, "Fehler/ungültig"),
        (11, "Fehler/ungültig"),
    ],
);
