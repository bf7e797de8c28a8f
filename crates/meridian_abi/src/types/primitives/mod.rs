mod address;
mod bool;
mod byte;
mod string;
mod uint;
