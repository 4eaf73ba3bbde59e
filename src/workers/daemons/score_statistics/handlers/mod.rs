pub mod invalidate_beatmap;
