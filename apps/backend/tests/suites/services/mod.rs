mod computer_games;
mod live_table;
mod reservations;
