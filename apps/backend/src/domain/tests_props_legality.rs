// Property-based tests for follow-suit legality and trick winners
use proptest::prelude::*;

use crate::domain::cards_logic::{
    effective_suit, hand_has_effective_suit, playable_cards, winning_index, EffectiveSuit,
};
use crate::domain::test_gens;

proptest! {
    #![proptest_config(test_gens::proptest_config())]

    /// Property: the legal set is never empty, and it is the whole hand
    /// exactly when the player holds nothing of the led effective suit or
    /// holds nothing else.
    #[test]
    fn prop_playable_non_empty_and_full_iff_void_or_all_following(
        (hand, lead) in test_gens::hand_and_lead(),
        game_type in test_gens::game_type(),
    ) {
        let legal = playable_cards(&hand, Some(lead), game_type);
        prop_assert!(!legal.is_empty());
        prop_assert!(legal.iter().all(|c| hand.contains(c)));

        let led = effective_suit(lead, game_type);
        let void = !hand_has_effective_suit(&hand, led, game_type);
        let all_following = hand.iter().all(|c| effective_suit(*c, game_type) == led);
        prop_assert_eq!(legal == hand, void || all_following);
        if !void {
            prop_assert!(legal.iter().all(|c| effective_suit(*c, game_type) == led));
        }
    }

    /// Property: leading, every card is legal.
    #[test]
    fn prop_leading_allows_any_card(
        hand in (1usize..=10).prop_flat_map(test_gens::unique_cards),
        game_type in test_gens::game_type(),
    ) {
        prop_assert_eq!(playable_cards(&hand, None, game_type), hand);
    }

    /// Property: a trick winner either follows the led suit or is trump.
    #[test]
    fn prop_trick_winner_follows_or_trumps(
        cards in test_gens::unique_cards(3),
        game_type in test_gens::game_type(),
    ) {
        let idx = winning_index(&cards, game_type).unwrap();
        let led = effective_suit(cards[0], game_type);
        let winner = effective_suit(cards[idx], game_type);
        prop_assert!(winner == led || winner == EffectiveSuit::Trump);
    }
}
