use crate::models::Game;

struct SampleGame {
    id: i64,
    title: &'static str,
    thumbnail: &'static str,
    short_description: &'static str,
    game_url: &'static str,
    genre: &'static str,
    platform: &'static str,
    publisher: &'static str,
    developer: &'static str,
    release_date: &'static str,
}

const SAMPLE_GAMES: [SampleGame; 8] = [
    SampleGame {
        id: 1,
        title: "Dauntless",
        thumbnail: "https://www.freetogame.com/g/1/thumbnail.jpg",
        short_description: "A free-to-play, co-op action RPG with gameplay similar to Monster Hunter.",
        game_url: "https://www.freetogame.com/open/dauntless",
        genre: "MMORPG",
        platform: "PC (Windows)",
        publisher: "Phoenix Labs",
        developer: "Phoenix Labs",
        release_date: "2019-05-21",
    },
    SampleGame {
        id: 2,
        title: "World of Tanks",
        thumbnail: "https://www.freetogame.com/g/2/thumbnail.jpg",
        short_description: "A team-based free-to-play MMO action game dedicated to armored warfare.",
        game_url: "https://www.freetogame.com/open/world-of-tanks",
        genre: "Shooter",
        platform: "PC (Windows)",
        publisher: "Wargaming",
        developer: "Wargaming",
        release_date: "2011-04-12",
    },
    SampleGame {
        id: 3,
        title: "Warframe",
        thumbnail: "https://www.freetogame.com/g/3/thumbnail.jpg",
        short_description: "A cooperative free-to-play third person online action shooter set in an evolving sci-fi world.",
        game_url: "https://www.freetogame.com/open/warframe",
        genre: "Shooter",
        platform: "PC (Windows)",
        publisher: "Digital Extremes",
        developer: "Digital Extremes",
        release_date: "2013-03-25",
    },
    SampleGame {
        id: 4,
        title: "CRSED: F.O.A.D.",
        thumbnail: "https://www.freetogame.com/g/4/thumbnail.jpg",
        short_description: "Take the battle royale genre and add superpowers and you have CRSED: F.O.A.D. (Aka Cuisine Royale: Second Edition)",
        game_url: "https://www.freetogame.com/open/crsed",
        genre: "Shooter",
        platform: "PC (Windows)",
        publisher: "Gaijin Entertainment",
        developer: "Darkflow Software",
        release_date: "2019-12-12",
    },
    SampleGame {
        id: 5,
        title: "Crossout",
        thumbnail: "https://www.freetogame.com/g/5/thumbnail.jpg",
        short_description: "A post-apocalyptic MMO vehicle combat game! ",
        game_url: "https://www.freetogame.com/open/crossout",
        genre: "Shooter",
        platform: "PC (Windows)",
        publisher: "Targem",
        developer: "Gaijin",
        release_date: "2017-05-30",
    },
    SampleGame {
        id: 6,
        title: "Apex Legends",
        thumbnail: "https://www.freetogame.com/g/23/thumbnail.jpg",
        short_description: "A free-to-play battle royale game where legendary characters battle for glory and fortune!",
        game_url: "https://www.freetogame.com/open/apex-legends",
        genre: "Shooter",
        platform: "PC (Windows)",
        publisher: "Electronic Arts",
        developer: "Respawn Entertainment",
        release_date: "2019-02-04",
    },
    SampleGame {
        id: 7,
        title: "Fortnite",
        thumbnail: "https://www.freetogame.com/g/57/thumbnail.jpg",
        short_description: "A free-to-play battle royale game with building mechanics and fast-paced combat.",
        game_url: "https://www.freetogame.com/open/fortnite",
        genre: "Shooter",
        platform: "PC (Windows)",
        publisher: "Epic Games",
        developer: "Epic Games",
        release_date: "2017-07-25",
    },
    SampleGame {
        id: 8,
        title: "Guild Wars 2",
        thumbnail: "https://www.freetogame.com/g/11/thumbnail.jpg",
        short_description: "A free-to-play MMORPG with dynamic events and customizable combat.",
        game_url: "https://www.freetogame.com/open/guild-wars-2",
        genre: "MMORPG",
        platform: "PC (Windows)",
        publisher: "ArenaNet",
        developer: "ArenaNet",
        release_date: "2012-08-28",
    },
];

/// Compiled-in demo catalog served when every network path fails.
pub fn sample_games() -> Vec<Game> {
    SAMPLE_GAMES
        .iter()
        .map(|g| Game {
            id: g.id,
            title: g.title.to_string(),
            thumbnail: g.thumbnail.to_string(),
            short_description: g.short_description.to_string(),
            game_url: g.game_url.to_string(),
            genre: g.genre.to_string(),
            platform: g.platform.to_string(),
            publisher: g.publisher.to_string(),
            developer: g.developer.to_string(),
            release_date: g.release_date.to_string(),
        })
        .collect()
}
