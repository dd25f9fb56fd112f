pub mod bungie;
