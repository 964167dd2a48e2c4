fn main() {
  arcade::main();
}
