use tugwalk::visitor;

struct Broken;

#[visitor(mode = prefix)]
impl Broken {
    #[prefix]
    fn enter(&mut self) {}
}

fn main() {
    let _ = Broken;
}
