pub mod fastforex;
