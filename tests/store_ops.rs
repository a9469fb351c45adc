mod common;

use bentogurido_core::card::{CardContent, CardId, CardType, Position, Size, TitleContent};
use bentogurido_core::grid::collection_has_overlap;
use bentogurido_core::hydrate::starter_cards;
use bentogurido_core::profile::{Profile, ProfilePatch};

use common::{harness, media_draft, social_draft, text_draft};

#[test]
fn added_cards_never_overlap() {
    let h = harness();
    for _ in 0..6 {
        h.store.add_card(media_draft());
    }
    for _ in 0..4 {
        h.store.add_card(social_draft());
    }
    h.tasks.run();
    assert!(!collection_has_overlap(&h.store.cards()));
}

#[test]
fn add_card_clamps_draft_size() {
    let h = harness();
    let mut draft = text_draft();
    draft.size = Size::new(9, 9);
    let id = h.store.add_card(draft);
    let card = h.store.card(&id).unwrap();
    assert_eq!(card.size, Size::new(4, 2));
}

#[test]
fn hydrate_replaces_state_and_clears_selection() {
    let h = harness();
    let id = h.store.add_card(text_draft());
    h.store.select_card(Some(id));
    assert!(h.store.snapshot().show_edit_panel);

    h.store.hydrate(starter_cards(), Profile::default());
    let snap = h.store.snapshot();
    assert!(snap.is_hydrated);
    assert_eq!(snap.selected_card_id, None);
    assert!(!snap.show_edit_panel);
    assert_eq!(snap.cards.len(), starter_cards().len());
}

#[test]
fn resize_reflows_into_the_first_free_slot() {
    let h = harness();
    let a = h.store.add_card(media_draft()); // (0,0) 2x2
    let b = h.store.add_card(media_draft()); // (2,0) 2x2

    // Growing A to 4x2 cannot stay anchored at (0,0) with B at (2,0).
    h.store.update_card_size(&a, Size::new(4, 2));

    let cards = h.store.cards();
    assert!(!collection_has_overlap(&cards));
    let a_card = h.store.card(&a).unwrap();
    let b_card = h.store.card(&b).unwrap();
    assert_eq!(a_card.size, Size::new(4, 2));
    assert_eq!(a_card.position, Position::new(4, 0));
    assert_eq!(b_card.position, Position::new(2, 0));
}

#[test]
fn resize_in_place_when_room_allows() {
    let h = harness();
    let a = h.store.add_card(social_draft()); // (0,0) 1x1
    h.store.update_card_size(&a, Size::new(3, 2));
    let card = h.store.card(&a).unwrap();
    assert_eq!(card.position, Position::new(0, 0));
    assert_eq!(card.size, Size::new(3, 2));
}

#[test]
fn resize_clamps_anchor_back_into_the_row() {
    let h = harness();
    // Seed a board where the card sits at the right edge.
    let a = h.store.add_card(social_draft());
    h.store.update_card_position(&a, Position::new(7, 0));
    h.store.update_card_size(&a, Size::new(2, 1));
    let card = h.store.card(&a).unwrap();
    assert_eq!(card.position, Position::new(6, 0));
    assert_eq!(card.size, Size::new(2, 1));
}

#[test]
fn reorder_swaps_equal_sized_cards_symmetrically() {
    let h = harness();
    let a = h.store.add_card(media_draft()); // (0,0)
    let b = h.store.add_card(media_draft()); // (2,0)

    h.store.reorder_cards(&a, &b);
    assert_eq!(h.store.card(&a).unwrap().position, Position::new(2, 0));
    assert_eq!(h.store.card(&b).unwrap().position, Position::new(0, 0));

    // Swapping back restores the original layout.
    h.store.reorder_cards(&b, &a);
    assert_eq!(h.store.card(&a).unwrap().position, Position::new(0, 0));
    assert_eq!(h.store.card(&b).unwrap().position, Position::new(2, 0));
}

#[test]
fn reorder_with_self_is_a_no_op() {
    let h = harness();
    let a = h.store.add_card(media_draft());
    let before = h.store.cards();
    h.store.reorder_cards(&a, &a);
    assert_eq!(h.store.cards(), before);
}

#[test]
fn duplicate_lands_beside_the_source_when_free() {
    let h = harness();
    let a = h.store.add_card(social_draft()); // (0,0) 1x1
    let copy = h.store.duplicate_card(&a).unwrap();
    let copy_card = h.store.card(&copy).unwrap();
    assert_eq!(copy_card.position, Position::new(1, 0));
    assert_eq!(copy_card.kind, CardType::Social);
    assert!(copy.is_provisional());
}

#[test]
fn duplicate_falls_back_to_search_when_the_neighbor_is_taken() {
    let h = harness();
    let a = h.store.add_card(media_draft()); // (0,0) 2x2
    let _b = h.store.add_card(media_draft()); // (2,0) 2x2
    let copy = h.store.duplicate_card(&a).unwrap();
    let copy_card = h.store.card(&copy).unwrap();
    assert_eq!(copy_card.position, Position::new(4, 0));
    assert!(!collection_has_overlap(&h.store.cards()));
}

#[test]
fn duplicate_of_missing_card_is_none() {
    let h = harness();
    assert!(h
        .store
        .duplicate_card(&CardId::Durable("ghost".to_string()))
        .is_none());
}

#[test]
fn selection_opens_and_closes_the_edit_panel() {
    let h = harness();
    let a = h.store.add_card(text_draft());
    h.store.select_card(Some(a.clone()));
    let snap = h.store.snapshot();
    assert_eq!(snap.selected_card_id, Some(a.clone()));
    assert!(snap.show_edit_panel);

    h.store.select_card(None);
    let snap = h.store.snapshot();
    assert_eq!(snap.selected_card_id, None);
    assert!(!snap.show_edit_panel);
}

#[test]
fn removing_the_selected_card_clears_selection() {
    let h = harness();
    let a = h.store.add_card(text_draft());
    h.tasks.run();
    let a = h.store.cards()[0].id.clone();
    h.store.select_card(Some(a.clone()));
    h.store.remove_card(&a);
    let snap = h.store.snapshot();
    assert_eq!(snap.selected_card_id, None);
    assert!(!snap.show_edit_panel);
}

#[test]
fn content_update_of_mismatched_kind_is_ignored() {
    let h = harness();
    let a = h.store.add_card(text_draft());
    let before = h.store.card(&a).unwrap();
    h.store.update_card_content(
        &a,
        CardContent::Title(TitleContent {
            text: "nope".to_string(),
        }),
    );
    assert_eq!(h.store.card(&a).unwrap(), before);
}

#[test]
fn leaving_edit_mode_drops_selection() {
    let h = harness();
    let a = h.store.add_card(text_draft());
    h.store.set_editing(true);
    h.store.select_card(Some(a));
    h.store.set_editing(false);
    let snap = h.store.snapshot();
    assert!(!snap.is_editing);
    assert_eq!(snap.selected_card_id, None);
    assert!(!snap.show_edit_panel);
}

#[test]
fn profile_update_applies_immediately() {
    let h = harness();
    h.store.update_profile(ProfilePatch {
        name: Some("Sugoi".to_string()),
        ..ProfilePatch::default()
    });
    assert_eq!(h.store.profile().name, "Sugoi");
}

#[test]
fn subscribers_fire_on_mutation_and_stop_after_drop() {
    use std::cell::Cell;
    use std::rc::Rc;

    let h = harness();
    let hits = Rc::new(Cell::new(0));
    let counter = Rc::clone(&hits);
    let sub = h.store.subscribe(Rc::new(move || {
        counter.set(counter.get() + 1);
    }));

    h.store.set_editing(true);
    assert_eq!(hits.get(), 1);

    drop(sub);
    h.store.set_editing(false);
    assert_eq!(hits.get(), 1);
}

#[test]
fn reset_clears_cards_and_pending_saves() {
    let h = harness();
    h.store.add_card(text_draft());
    h.tasks.run();
    let a = h.store.cards()[0].id.clone();
    h.store.update_card_position(&a, Position::new(3, 3));
    assert_eq!(h.timers.pending(), 1);

    h.store.reset();
    assert!(h.store.cards().is_empty());
    assert_eq!(h.timers.pending(), 0);
}
