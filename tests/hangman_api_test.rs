//! End-to-end tests of the hangman operations over a temporary database.

use std::thread;

use tempfile::NamedTempFile;

use strictly_hangman::{
    GameService, GameSnapshot, HangmanApi, HangmanErrorKind, HangmanRepository,
};

/// Opens a fresh API over a temporary database with a seeded word picker.
fn setup_api() -> (NamedTempFile, HangmanApi) {
    let db_file = NamedTempFile::new().expect("Failed to create temp file");
    let db_path = db_file.path().to_str().expect("Invalid path").to_string();
    let repo = HangmanRepository::open(db_path).expect("Failed to open repository");
    let api = HangmanApi::with_games(repo.clone(), GameService::with_seed(repo, 7), 10);
    (db_file, api)
}

/// Registers `user` and the single catalog word, then starts a game.
fn start_with_word(api: &HangmanApi, user: &str, word: &str) -> GameSnapshot {
    api.register_word(word).expect("Word should register");
    api.register_user(user, None).expect("User should register");
    api.start_game(user).expect("Game should start")
}

fn guess(api: &HangmanApi, game: &GameSnapshot, letter: &str) -> GameSnapshot {
    api.submit_guess(&game.session_ref, letter)
        .expect("Guess should be accepted")
}

#[test]
fn test_winning_game_records_score() {
    let (_db, api) = setup_api();
    let game = start_with_word(&api, "alice", "CAT");
    assert_eq!(game.answer, "___");
    assert_eq!(game.attempts_remaining, 7);
    assert_eq!(game.message, "Good luck playing Hangman!");

    let game = guess(&api, &game, "C");
    assert_eq!(game.answer, "C__");
    assert_eq!(game.message, "You guessed correct!");
    let game = guess(&api, &game, "a");
    assert_eq!(game.answer, "CA_");
    let game = guess(&api, &game, "T");
    assert_eq!(game.answer, "CAT");
    assert!(game.game_over);
    assert_eq!(game.message, "You won!");
    assert_eq!(game.history, "C, A, T");
    assert_eq!(game.failed_tries, "");

    let profile = api.get_user("alice").expect("User exists");
    assert_eq!(profile.wins, 1);
    assert_eq!(profile.total_played, 1);
    assert_eq!(profile.total_score, 10);
    assert_eq!(profile.average_score, 10.0);

    let scores = api.high_scores(None).expect("Scores load");
    assert_eq!(scores.len(), 1);
    assert!(scores[0].won);
    assert_eq!(scores[0].guesses, 7);
    assert_eq!(scores[0].points, 10);
    assert_eq!(scores[0].user_name, "alice");
}

#[test]
fn test_losing_game_records_zero_score() {
    let (_db, api) = setup_api();
    let mut game = start_with_word(&api, "bob", "CAT");

    for letter in ["B", "D", "E", "F", "G", "H"] {
        game = guess(&api, &game, letter);
        assert_eq!(game.message, "Uh-oh. Try again.");
    }
    assert_eq!(game.attempts_remaining, 1);

    let game = guess(&api, &game, "I");
    assert!(game.game_over);
    assert_eq!(game.attempts_remaining, 0);
    assert_eq!(game.message, "Game over! The word was: CAT");
    assert_eq!(game.answer, "___");

    let profile = api.get_user("bob").expect("User exists");
    assert_eq!(profile.wins, 0);
    assert_eq!(profile.total_played, 1);
    assert_eq!(profile.total_score, 0);

    let scores = api.high_scores(None).expect("Scores load");
    assert_eq!(scores.len(), 1);
    assert!(!scores[0].won);
    assert_eq!(scores[0].points, 0);
}

#[test]
fn test_repeated_guess_changes_nothing() {
    let (_db, api) = setup_api();
    let game = start_with_word(&api, "carol", "DOG");

    let first = guess(&api, &game, "X");
    let second = guess(&api, &game, "x");
    assert_eq!(second.message, "You have already tried that!");
    assert_eq!(second.attempts_remaining, first.attempts_remaining);
    assert_eq!(second.history, "X");
    assert_eq!(second.failed_tries, "X");

    guess(&api, &game, "O");
    let again = guess(&api, &game, "o");
    assert_eq!(again.message, "You have already tried that!");
    assert_eq!(again.history, "X, O");
}

#[test]
fn test_invalid_guess_rejected_without_change() {
    let (_db, api) = setup_api();
    let game = start_with_word(&api, "dave", "DOG");

    for input in ["", "ab", "1", "é", "ı", "ſ"] {
        let err = api
            .submit_guess(&game.session_ref, input)
            .expect_err("Guess should be rejected");
        assert!(matches!(err.kind(), HangmanErrorKind::InvalidInput(_)));
    }

    let current = api.get_game(&game.session_ref).expect("Game exists");
    assert_eq!(current.attempts_remaining, 7);
    assert_eq!(current.history, "");
    assert_eq!(current.message, "Game in progress!");
}

#[test]
fn test_finished_game_rejects_guesses() {
    let (_db, api) = setup_api();
    let game = start_with_word(&api, "erin", "I");
    let done = guess(&api, &game, "i");
    assert!(done.game_over);

    for input in ["Q", "i", "not a letter"] {
        let err = api
            .submit_guess(&game.session_ref, input)
            .expect_err("Finished game should reject guesses");
        assert!(matches!(err.kind(), HangmanErrorKind::GameEnded(_)));
    }

    let current = api.get_game(&game.session_ref).expect("Game exists");
    assert_eq!(current.message, "This game has ended!");
    assert_eq!(current.history, done.history);
    assert_eq!(current.attempts_remaining, done.attempts_remaining);
    assert_eq!(api.high_scores(None).expect("Scores load").len(), 1);
    assert_eq!(api.get_user("erin").expect("User exists").total_played, 1);
}

#[test]
fn test_unknown_references() {
    let (_db, api) = setup_api();
    for reference in ["9999", "not-a-number", ""] {
        let err = api.get_game(reference).expect_err("Game should be missing");
        assert!(matches!(err.kind(), HangmanErrorKind::NotFound(_)));
        let err = api
            .submit_guess(reference, "A")
            .expect_err("Game should be missing");
        assert!(matches!(err.kind(), HangmanErrorKind::NotFound(_)));
    }

    let err = api.get_user("nobody").expect_err("User should be missing");
    assert!(matches!(err.kind(), HangmanErrorKind::NotFound(_)));
    let err = api.start_game("nobody").expect_err("User should be missing");
    assert!(matches!(err.kind(), HangmanErrorKind::NotFound(_)));
    let err = api
        .list_user_games("nobody", false)
        .expect_err("User should be missing");
    assert!(matches!(err.kind(), HangmanErrorKind::NotFound(_)));
}

#[test]
fn test_empty_catalog_is_unavailable() {
    let (_db, api) = setup_api();
    api.register_user("finn", None).expect("User should register");
    let err = api.start_game("finn").expect_err("Catalog is empty");
    assert!(matches!(err.kind(), HangmanErrorKind::Unavailable(_)));
}

#[test]
fn test_duplicate_user_conflicts() {
    let (_db, api) = setup_api();
    let created = api.register_user("gina", None).expect("User should register");
    assert_eq!(created.message, "User gina created!");

    let err = api
        .register_user("gina", Some("g@example.com".to_string()))
        .expect_err("Name is taken");
    assert!(matches!(err.kind(), HangmanErrorKind::Conflict(_)));

    let err = api.register_user("", None).expect_err("Name is empty");
    assert!(matches!(err.kind(), HangmanErrorKind::InvalidInput(_)));
}

#[test]
fn test_word_registration_rules() {
    let (_db, api) = setup_api();
    let added = api.register_word("cat").expect("Word should register");
    assert_eq!(added.message, "Added CAT to the list!");

    let err = api.register_word("CAT").expect_err("Word already listed");
    assert!(matches!(err.kind(), HangmanErrorKind::Conflict(_)));

    for bad in ["", "two words", "c4t", "naïve", "straße", "ﬁx"] {
        let err = api.register_word(bad).expect_err("Word is malformed");
        assert!(matches!(err.kind(), HangmanErrorKind::InvalidInput(_)));
    }
}

#[test]
fn test_started_games_use_catalog_words() {
    let (_db, api) = setup_api();
    for word in ["OX", "EMU", "LYNX"] {
        api.register_word(word).expect("Word should register");
    }
    api.register_user("hank", None).expect("User should register");

    let mut lengths = Vec::new();
    for _ in 0..60 {
        let game = api.start_game("hank").expect("Game should start");
        assert!(game.answer.chars().all(|c| c == '_'));
        lengths.push(game.answer.len());
    }
    for expected in [2, 3, 4] {
        assert!(lengths.contains(&expected), "Every word should be picked");
    }
    assert!(lengths.iter().all(|len| [2, 3, 4].contains(len)));
}

#[test]
fn test_cancel_game() {
    let (_db, api) = setup_api();
    let open = start_with_word(&api, "iris", "I");
    let done = api.start_game("iris").expect("Game should start");
    guess(&api, &done, "i");

    let err = api
        .cancel_game(&done.session_ref)
        .expect_err("Finished game cannot be cancelled");
    assert!(matches!(err.kind(), HangmanErrorKind::InvalidOperation(_)));

    let cancelled = api.cancel_game(&open.session_ref).expect("Cancel succeeds");
    assert_eq!(cancelled.message, format!("Game {} deleted.", open.session_ref));

    let err = api
        .get_game(&open.session_ref)
        .expect_err("Cancelled game is gone");
    assert!(matches!(err.kind(), HangmanErrorKind::NotFound(_)));
    let err = api
        .cancel_game(&open.session_ref)
        .expect_err("Cancelled game is gone");
    assert!(matches!(err.kind(), HangmanErrorKind::NotFound(_)));

    let profile = api.get_user("iris").expect("User exists");
    assert_eq!(profile.total_played, 1);
}

#[test]
fn test_list_user_games_by_completion() {
    let (_db, api) = setup_api();
    let first = start_with_word(&api, "jack", "A");
    api.start_game("jack").expect("Game should start");
    guess(&api, &first, "a");

    let open = api.list_user_games("jack", false).expect("List loads");
    assert_eq!(open.len(), 1);
    assert!(!open[0].game_over);
    assert_eq!(open[0].message, "Game in progress");

    let finished = api.list_user_games("jack", true).expect("List loads");
    assert_eq!(finished.len(), 1);
    assert_eq!(finished[0].session_ref, first.session_ref);
    assert_eq!(finished[0].message, "Game complete");
}

#[test]
fn test_game_history_lists_moves() {
    let (_db, api) = setup_api();
    let game = start_with_word(&api, "kim", "CAT");
    let empty = api.game_history(&game.session_ref).expect("History loads");
    assert_eq!(empty.message, "Moves made: ");

    guess(&api, &game, "C");
    guess(&api, &game, "X");
    guess(&api, &game, "A");
    let history = api.game_history(&game.session_ref).expect("History loads");
    assert_eq!(history.message, "Moves made: C, X, A");
}

#[test]
fn test_leaderboard_and_rankings() {
    let (_db, api) = setup_api();
    api.register_word("A").expect("Word should register");
    for name in ["lee", "max", "ned"] {
        api.register_user(name, None).expect("User should register");
    }

    // lee: one clean win, 10 points over 1 game
    let game = api.start_game("lee").expect("Game should start");
    guess(&api, &game, "A");

    // max: a win after one miss and then a loss, 9 points over 2 games
    let game = api.start_game("max").expect("Game should start");
    guess(&api, &game, "B");
    guess(&api, &game, "A");
    let mut game = api.start_game("max").expect("Game should start");
    for letter in ["B", "C", "D", "E", "F", "G", "H"] {
        game = guess(&api, &game, letter);
    }
    assert!(game.game_over);

    let leaders = api.leaderboard(None).expect("Leaderboard loads");
    let names: Vec<_> = leaders.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, ["lee", "max", "ned"]);
    assert_eq!(leaders[1].total_score, 9);
    assert_eq!(leaders[1].total_played, 2);

    let top = api.leaderboard(Some(1)).expect("Leaderboard loads");
    assert_eq!(top.len(), 1);
    assert_eq!(top[0].name, "lee");

    let ranks = api.rankings().expect("Rankings load");
    let names: Vec<_> = ranks.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, ["lee", "max", "ned"]);
    assert_eq!(ranks[1].average_score, 4.5);
    assert_eq!(ranks[2].average_score, 0.0);

    let scores = api.high_scores(Some(2)).expect("Scores load");
    let points: Vec<_> = scores.iter().map(|s| s.points).collect();
    assert_eq!(points, [10, 9]);
}

#[test]
fn test_pending_reminders() {
    let (_db, api) = setup_api();
    api.register_word("OWL").expect("Word should register");
    api.register_user("olga", Some("olga@example.com".to_string()))
        .expect("User should register");
    api.register_user("pete", None).expect("User should register");
    api.register_user("quinn", Some("quinn@example.com".to_string()))
        .expect("User should register");

    api.start_game("olga").expect("Game should start");
    api.start_game("olga").expect("Game should start");
    api.start_game("pete").expect("Game should start");

    let reminders = api.pending_reminders().expect("Reminders load");
    assert_eq!(reminders.len(), 1);
    assert_eq!(reminders[0].name(), "olga");
    assert_eq!(reminders[0].email(), "olga@example.com");
    assert_eq!(*reminders[0].open_games(), 2);
}

#[test]
fn test_concurrent_completions_count_every_game() {
    let (_db, api) = setup_api();
    let first = start_with_word(&api, "rosa", "A");
    let second = api.start_game("rosa").expect("Game should start");

    thread::scope(|scope| {
        for game in [&first, &second] {
            let api = api.clone();
            scope.spawn(move || guess(&api, game, "A"));
        }
    });

    let profile = api.get_user("rosa").expect("User exists");
    assert_eq!(profile.total_played, 2);
    assert_eq!(profile.wins, 2);
    assert_eq!(profile.total_score, 20);
    assert_eq!(api.high_scores(None).expect("Scores load").len(), 2);
}
