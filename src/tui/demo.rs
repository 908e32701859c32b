//! Sample marketing page for the demo host
//!
//! Plays the collaborator role from the structural contract: the page
//! and its popup markup are fully built before the controller touches
//! them. The controller only ever toggles their state.

use crate::page::{Document, Element};
use crate::popup::markers;

/// Build the demo page: a hero with a schedule CTA, a classes section,
/// a booking section used as an anchor target, and two popups that
/// cross-navigate.
pub fn sample_page() -> Document {
    let mut doc = Document::new();

    let header = doc.append_to_body(Element::new("header").with_id("top"));
    doc.append(
        header,
        Element::new("h1").with_text("Harbor Yoga Studio"),
    );
    doc.append(
        header,
        Element::new("p").with_text("Small classes by the waterfront, every day of the week."),
    );

    let hero = doc.append_to_body(Element::new("section").with_id("hero"));
    doc.append(hero, Element::new("h2").with_text("Find your flow"));
    doc.append(
        hero,
        Element::new("p")
            .with_text("Morning and evening sessions for every level. First class is free."),
    );
    doc.append(
        hero,
        Element::new("button")
            .with_id("view-schedule")
            .with_attr(markers::TARGET_ATTR, "#popup-schedule")
            .with_text("View schedule"),
    );

    let classes = doc.append_to_body(Element::new("section").with_id("classes"));
    doc.append(classes, Element::new("h2").with_text("Classes"));
    let card_flow = doc.append(classes, Element::new("article"));
    doc.append(card_flow, Element::new("h3").with_text("Vinyasa Flow"));
    doc.append(
        card_flow,
        Element::new("p").with_text("A dynamic practice linking breath and movement."),
    );
    let card_yin = doc.append(classes, Element::new("article"));
    doc.append(card_yin, Element::new("h3").with_text("Yin & Restore"));
    doc.append(
        card_yin,
        Element::new("p").with_text("Long, quiet holds to finish the day slowly."),
    );
    doc.append(
        classes,
        Element::new("button")
            .with_id("see-pricing")
            .with_attr(markers::TARGET_ATTR, "#popup-pricing")
            .with_text("See pricing"),
    );

    let book = doc.append_to_body(Element::new("section").with_id("book-now"));
    doc.append(book, Element::new("h2").with_text("Book now"));
    doc.append(
        book,
        Element::new("p")
            .with_text("Reserve a mat up to two weeks ahead. Cancellation is free until 6pm."),
    );
    doc.append(
        book,
        Element::new("button")
            .with_id("reserve")
            .with_text("Reserve a spot"),
    );

    let footer = doc.append_to_body(Element::new("footer"));
    doc.append(
        footer,
        Element::new("p").with_text("Harbor Yoga Studio - Pier 9, open daily 7:00-21:00"),
    );

    // Popup markup: overlay wrapping exactly one modal each.
    let schedule_overlay =
        doc.append_to_body(Element::new("div").with_class(markers::OVERLAY_CLASS));
    let schedule = doc.append(
        schedule_overlay,
        Element::new("div")
            .with_class(markers::MODAL_CLASS)
            .with_id("popup-schedule"),
    );
    doc.append(schedule, Element::new("h3").with_text("Weekly schedule"));
    doc.append(
        schedule,
        Element::new("p").with_text("Mon-Fri: 7:30 flow, 12:15 lunch express, 18:30 slow burn."),
    );
    doc.append(
        schedule,
        Element::new("p").with_text("Weekends: 9:00 long flow, 17:00 yin & restore."),
    );
    doc.append(
        schedule,
        Element::new("button")
            .with_attr(markers::TARGET_ATTR, "#popup-pricing")
            .with_text("See pricing"),
    );
    doc.append(
        schedule,
        Element::new("a")
            .with_attr("href", "#book-now")
            .with_attr(markers::GOTO_ATTR, "#book-now")
            .with_text("Book a class"),
    );
    doc.append(
        schedule,
        Element::new("button")
            .with_attr(markers::CLOSE_ATTR, "")
            .with_text("Close"),
    );

    let pricing_overlay =
        doc.append_to_body(Element::new("div").with_class(markers::OVERLAY_CLASS));
    let pricing = doc.append(
        pricing_overlay,
        Element::new("div")
            .with_class(markers::MODAL_CLASS)
            .with_id("popup-pricing"),
    );
    doc.append(pricing, Element::new("h3").with_text("Pricing"));
    doc.append(
        pricing,
        Element::new("p").with_text("Drop-in 18, five-pack 80, monthly unlimited 120."),
    );
    doc.append(
        pricing,
        Element::new("button")
            .with_attr(markers::TARGET_ATTR, "#popup-schedule")
            .with_text("Back to schedule"),
    );
    doc.append(
        pricing,
        Element::new("a")
            .with_attr("href", "#book-now")
            .with_attr(markers::GOTO_ATTR, "#book-now")
            .with_text("Book a class"),
    );
    doc.append(
        pricing,
        Element::new("button")
            .with_attr(markers::CLOSE_ATTR, "")
            .with_text("Close"),
    );

    doc
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::Selector;

    #[test]
    fn test_sample_page_satisfies_structural_contract() {
        let doc = sample_page();

        for id in ["popup-schedule", "popup-pricing"] {
            let modal = doc.get_element_by_id(id).expect("modal exists");
            assert!(doc.element(modal).has_class(markers::MODAL_CLASS));

            // directly wrapped in an overlay
            let parent = doc.parent(modal).expect("modal has parent");
            assert!(doc.element(parent).has_class(markers::OVERLAY_CLASS));

            // exactly one modal per overlay
            let modals = doc
                .children(parent)
                .iter()
                .filter(|&&c| doc.element(c).has_class(markers::MODAL_CLASS))
                .count();
            assert_eq!(modals, 1);
        }
    }

    #[test]
    fn test_triggers_reference_existing_modals() {
        let doc = sample_page();
        let selector = Selector::attr(markers::TARGET_ATTR);

        for node in doc.descendants(doc.body()) {
            if selector.matches(doc.element(node)) {
                let target = doc.element(node).attribute(markers::TARGET_ATTR).unwrap();
                assert!(
                    doc.query_selector(target).unwrap().is_some(),
                    "dangling trigger {target}"
                );
            }
        }
    }

    #[test]
    fn test_goto_anchor_exists() {
        let doc = sample_page();
        assert!(doc.get_element_by_id("book-now").is_some());
    }
}
