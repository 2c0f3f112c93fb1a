mod helpers;
mod mocks;
mod verify;
