use foundation::LonLatBounds;
use formats::ZoneDocument;

use crate::symbology::ZoneStyle;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct OverlayId(pub u64);

/// One drawable zone boundary: the geometry plus how to draw it.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneOverlay {
    pub id: OverlayId,
    pub service: String,
    pub document: ZoneDocument,
    pub style: ZoneStyle,
}

impl ZoneOverlay {
    pub fn bounds(&self) -> LonLatBounds {
        self.document.bounds()
    }
}

/// Holder of the single live overlay.
///
/// Invariant: at most one overlay exists at any moment. `replace` hands
/// back the detached predecessor so the map surface can drop its layer
/// before the new one is attached.
#[derive(Debug, Default)]
pub struct OverlaySlot {
    attached: Option<ZoneOverlay>,
    next_id: u64,
}

impl OverlaySlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an overlay for `document` and make it the attached one.
    ///
    /// Returns `(new, detached_predecessor)`.
    pub fn replace(
        &mut self,
        service: impl Into<String>,
        document: ZoneDocument,
        style: ZoneStyle,
    ) -> (&ZoneOverlay, Option<ZoneOverlay>) {
        self.next_id += 1;
        let overlay = ZoneOverlay {
            id: OverlayId(self.next_id),
            service: service.into(),
            document,
            style,
        };
        let previous = self.attached.replace(overlay);
        (self.attached.as_ref().expect("just attached"), previous)
    }

    pub fn attached(&self) -> Option<&ZoneOverlay> {
        self.attached.as_ref()
    }

    pub fn detach(&mut self) -> Option<ZoneOverlay> {
        self.attached.take()
    }
}

#[cfg(test)]
mod tests {
    use super::OverlaySlot;
    use formats::ZoneDocument;

    mod test_doc {
        use formats::ZoneDocument;

        pub fn square(name: &str, lon0: f64, lat0: f64) -> ZoneDocument {
            let payload = format!(
                r#"{{
                    "type": "Feature",
                    "properties": {{"name": "{name}"}},
                    "geometry": {{
                        "type": "Polygon",
                        "coordinates": [[
                            [{lon0}, {lat0}], [{lon1}, {lat0}],
                            [{lon1}, {lat1}], [{lon0}, {lat1}],
                            [{lon0}, {lat0}]
                        ]]
                    }}
                }}"#,
                lon1 = lon0 + 0.5,
                lat1 = lat0 + 0.5,
            );
            ZoneDocument::from_geojson_str(&payload).expect("test document")
        }
    }

    #[test]
    fn starts_empty() {
        let slot = OverlaySlot::new();
        assert!(slot.attached().is_none());
    }

    #[test]
    fn replace_detaches_the_predecessor() {
        let mut slot = OverlaySlot::new();

        let (first, previous) =
            slot.replace("North Bay", test_doc::square("a", -122.8, 38.3), Default::default());
        let first_id = first.id;
        assert!(previous.is_none());

        let (second, previous) =
            slot.replace("East Bay", test_doc::square("b", -122.3, 37.7), Default::default());
        let second_id = second.id;
        assert_ne!(second_id, first_id);
        let previous = previous.expect("predecessor detached");
        assert_eq!(previous.id, first_id);
        assert_eq!(previous.service, "North Bay");

        // Exactly one overlay remains attached.
        assert_eq!(slot.attached().map(|o| o.id), Some(second_id));
    }

    #[test]
    fn replacing_with_the_same_service_still_yields_one_overlay() {
        let mut slot = OverlaySlot::new();
        let doc: ZoneDocument = test_doc::square("a", -122.8, 38.3);
        slot.replace("North Bay", doc.clone(), Default::default());
        let (_, previous) = slot.replace("North Bay", doc, Default::default());
        assert!(previous.is_some());
        assert!(slot.attached().is_some());
    }

    #[test]
    fn overlay_bounds_come_from_the_document() {
        let mut slot = OverlaySlot::new();
        let (overlay, _) =
            slot.replace("North Bay", test_doc::square("a", -122.8, 38.3), Default::default());
        let b = overlay.bounds();
        assert_eq!(b.min.lon_deg, -122.8);
        assert_eq!(b.max.lat_deg, 38.8);
    }
}
